//! Shader source as an ordered sequence of lines

use std::fmt;

/// Line terminator used when the text is written back out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Generated shader text, addressed by line index
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShaderText {
    lines: Vec<String>,
    line_ending: LineEnding,
}

impl ShaderText {
    /// Split source into lines.
    ///
    /// A trailing terminator does not produce an extra empty line. The line
    /// ending is `CrLf` when at least half of the terminators carry a `\r`.
    pub fn parse(source: &str) -> Self {
        let crlf = source.matches("\r\n").count();
        let lf = source.matches('\n').count() - crlf;
        let line_ending = if crlf > 0 && crlf >= lf {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        };

        let lines = if source.is_empty() {
            Vec::new()
        } else {
            let body = source.strip_suffix('\n').unwrap_or(source);
            body.split('\n')
                .map(|raw| raw.strip_suffix('\r').unwrap_or(raw).to_string())
                .collect()
        };

        Self { lines, line_ending }
    }

    pub fn from_lines(lines: Vec<String>) -> Self {
        Self {
            lines,
            line_ending: LineEnding::Lf,
        }
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Join the lines back into source, terminating every line
    pub fn to_source(&self) -> String {
        let ending = self.line_ending.as_str();
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.len() + ending.len()).sum());
        for line in &self.lines {
            out.push_str(line);
            out.push_str(ending);
        }
        out
    }
}

impl fmt::Display for ShaderText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_source())
    }
}

impl From<Vec<String>> for ShaderText {
    fn from(lines: Vec<String>) -> Self {
        Self::from_lines(lines)
    }
}

impl From<&[&str]> for ShaderText {
    fn from(lines: &[&str]) -> Self {
        Self::from_lines(lines.iter().map(|l| l.to_string()).collect())
    }
}
