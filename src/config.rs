/// Options handed to the classifier by the command line layer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Append a freshly computed `*XX` to sentences that lack a checksum
    /// instead of marking them with `##`.
    pub append: bool,
    /// Anything above zero writes one trace line per consumed byte.
    pub debug_level: u32,
    /// Separator between binary message header and body. Carried for the
    /// binary log format, the classifier itself does not look at it.
    pub separator: Option<String>,
}

impl Config {
    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    pub fn debug_level(mut self, level: u32) -> Self {
        self.debug_level = level;
        self
    }

    pub fn separator(mut self, separator: Option<String>) -> Self {
        self.separator = separator;
        self
    }

    pub fn tracing(&self) -> bool {
        self.debug_level > 0
    }
}
