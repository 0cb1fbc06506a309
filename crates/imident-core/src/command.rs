//! Argument lists for the ImageMagick binaries.
//!
//! Both commands read the image from stdin (`-`) and, for `convert`, write the
//! result to stdout. Values are passed through untouched; ImageMagick decides
//! what is legal and reports problems on stderr.

/// `identify -verbose -`
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifyCommand;

impl IdentifyCommand {
    pub fn args(&self) -> Vec<String> {
        vec!["-verbose".to_string(), "-".to_string()]
    }
}

/// Builder for a `convert - <operations> <output>` invocation.
///
/// ```
/// use imident_core::ConvertCommand;
///
/// let cmd = ConvertCommand::new().crop("40x40+90+90").resize("200x200").format("png");
/// assert_eq!(cmd.args(), ["-", "-crop", "40x40+90+90", "-resize", "200x200", "png:-"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertCommand {
    operations: Vec<String>,
    format: Option<String>,
}

impl ConvertCommand {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(mut self, flag: &str) -> Self {
        self.operations.push(flag.to_string());
        self
    }

    fn option(mut self, flag: &str, value: impl Into<String>) -> Self {
        self.operations.push(flag.to_string());
        self.operations.push(value.into());
        self
    }

    /// `-auto-orient`, added only when `enabled`.
    pub fn auto_orient(self, enabled: bool) -> Self {
        if enabled {
            self.flag("-auto-orient")
        } else {
            self
        }
    }

    /// `-crop <geometry>`
    pub fn crop(self, geometry: impl Into<String>) -> Self {
        self.option("-crop", geometry)
    }

    /// `-extent <geometry>`
    pub fn extent(self, geometry: impl Into<String>) -> Self {
        self.option("-extent", geometry)
    }

    /// `-define <key=value>`
    pub fn define(self, setting: impl Into<String>) -> Self {
        self.option("-define", setting)
    }

    /// `-filter <type>`
    pub fn filter(self, filter: impl Into<String>) -> Self {
        self.option("-filter", filter)
    }

    /// `-gravity <type>` (NorthWest, North, ..., SouthEast, Center)
    pub fn gravity(self, gravity: impl Into<String>) -> Self {
        self.option("-gravity", gravity)
    }

    /// `-liquid-rescale <geometry>`
    pub fn liquid_rescale(self, geometry: impl Into<String>) -> Self {
        self.option("-liquid-rescale", geometry)
    }

    /// `-quality <n>`
    pub fn quality(self, quality: u32) -> Self {
        self.option("-quality", quality.to_string())
    }

    /// `-resize <geometry>`
    pub fn resize(self, geometry: impl Into<String>) -> Self {
        self.option("-resize", geometry)
    }

    /// `-rotate <degrees>`, optionally suffixed with `<` or `>`.
    pub fn rotate(self, degrees: impl Into<String>) -> Self {
        self.option("-rotate", degrees)
    }

    /// `-sample <geometry>`
    pub fn sample(self, geometry: impl Into<String>) -> Self {
        self.option("-sample", geometry)
    }

    /// `-scale <geometry>`
    pub fn scale(self, geometry: impl Into<String>) -> Self {
        self.option("-scale", geometry)
    }

    /// `-sharpen <radius>[x<sigma>]`
    pub fn sharpen(self, radius: impl Into<String>) -> Self {
        self.option("-sharpen", radius)
    }

    /// `-strip`, added only when `enabled`.
    pub fn strip(self, enabled: bool) -> Self {
        if enabled {
            self.flag("-strip")
        } else {
            self
        }
    }

    /// `-thumbnail <geometry>`
    pub fn thumbnail(self, geometry: impl Into<String>) -> Self {
        self.option("-thumbnail", geometry)
    }

    /// `-unsharp <radius>x<sigma>+<amount>+<threshold>`
    pub fn unsharp(self, spec: impl Into<String>) -> Self {
        self.option("-unsharp", spec)
    }

    /// Output format; the result is written as `<format>:-`.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Output target: `-` keeps the input format.
    pub fn output(&self) -> String {
        match &self.format {
            Some(format) => format!("{format}:-"),
            None => "-".to_string(),
        }
    }

    /// Full argument list: stdin, the operations in order, then the output.
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.operations.len() + 2);
        args.push("-".to_string());
        args.extend(self.operations.iter().cloned());
        args.push(self.output());
        args
    }
}
