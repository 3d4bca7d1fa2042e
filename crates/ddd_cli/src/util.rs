// Utility functions for CLI

use ddd_error::DddError;
use ddd_export::{BlendScene, SceneSelection};
use ddd_parser::{BlendFile, DecompressionPolicy, ParseOptions};
use log::info;
use owo_colors::OwoColorize;
use std::cell::RefCell;
use std::path::Path;

/// Command execution context containing common parameters
pub struct CommandContext<'a> {
    pub parse_options: &'a ParseOptions,
    pub output: &'a OutputHandler,
}

impl<'a> CommandContext<'a> {
    pub fn new(parse_options: &'a ParseOptions, output: &'a OutputHandler) -> Self {
        Self {
            parse_options,
            output,
        }
    }

    /// Load a blend file and select a scene and view layer in it
    pub fn load_scene(&self, path: &Path, selection: SceneSelection) -> Result<BlendScene, DddError> {
        info!("Loading blend file: {}", path.display());
        let file = BlendFile::from_path_with(path, self.parse_options)?;
        info!(
            "Blend file loaded: version {}, {} blocks",
            file.header().version_string(),
            file.blocks_len()
        );
        Ok(BlendScene::new(file, selection))
    }
}

/// Output handler that respects quiet mode
pub struct OutputHandler {
    quiet: bool,
    captured: Option<RefCell<Vec<String>>>,
}

impl OutputHandler {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            captured: None,
        }
    }

    /// Keep printed lines in memory instead of writing to stdout
    #[cfg(test)]
    pub fn capturing(quiet: bool) -> Self {
        Self {
            quiet,
            captured: Some(RefCell::new(Vec::new())),
        }
    }

    /// Lines printed so far by a capturing handler
    #[cfg(test)]
    pub fn lines(&self) -> Vec<String> {
        self.captured
            .as_ref()
            .map(|lines| lines.borrow().clone())
            .unwrap_or_default()
    }

    /// Print explanatory text (suppressed in quiet mode)
    pub fn print_info(&self, text: &str) {
        if !self.quiet {
            self.emit(text);
        }
    }

    /// Print raw results (always shown)
    pub fn print_result(&self, text: &str) {
        self.emit(text);
    }

    fn emit(&self, text: &str) {
        match &self.captured {
            Some(lines) => lines.borrow_mut().push(text.to_string()),
            None => println!("{text}"),
        }
    }
}

pub fn create_parse_options(max_in_memory_mb: usize, no_mmap: bool) -> ParseOptions {
    ParseOptions {
        decompression_policy: DecompressionPolicy {
            max_in_memory_bytes: max_in_memory_mb * 1024 * 1024,
            prefer_mmap: !no_mmap,
        },
        ..ParseOptions::default()
    }
}

// Colorization helpers
pub fn should_use_colors() -> bool {
    isatty::stdout_isatty()
}

pub fn colorize_index(index: usize) -> String {
    if should_use_colors() {
        index.to_string().green().to_string()
    } else {
        index.to_string()
    }
}

pub fn colorize_name(name: &str) -> String {
    if should_use_colors() {
        name.yellow().to_string()
    } else {
        name.to_string()
    }
}

pub fn colorize_dim(text: &str) -> String {
    if should_use_colors() {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_parse_options() {
        let options = create_parse_options(16, true);
        assert_eq!(options.decompression_policy.max_in_memory_bytes, 16 * 1024 * 1024);
        assert!(!options.decompression_policy.prefer_mmap);

        let options = create_parse_options(256, false);
        assert!(options.decompression_policy.prefer_mmap);
    }

    #[test]
    fn test_quiet_output_keeps_results() {
        let output = OutputHandler::capturing(true);
        output.print_info("hidden");
        output.print_result("shown");
        assert_eq!(output.lines(), vec!["shown"]);

        let output = OutputHandler::capturing(false);
        output.print_info("a");
        output.print_result("b");
        assert_eq!(output.lines(), vec!["a", "b"]);
    }
}
