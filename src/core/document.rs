use regex::Regex;

/// A text file as a list of lines, for edit-in-place rewrites of
/// `CHANGELOG.md` and `readme.txt`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineDocument {
    lines: Vec<String>,
    trailing_newline: bool,
}

impl LineDocument {
    pub fn parse(text: &str) -> Self {
        let trailing_newline = text.ends_with('\n');
        let body = text.strip_suffix('\n').unwrap_or(text);
        let lines = if text.is_empty() {
            Vec::new()
        } else {
            body.split('\n').map(str::to_string).collect()
        };
        Self {
            lines,
            trailing_newline,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn position(&self, re: &Regex) -> Option<usize> {
        self.position_from(0, re)
    }

    pub fn position_from(&self, start: usize, re: &Regex) -> Option<usize> {
        self.lines
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, line)| re.is_match(line))
            .map(|(idx, _)| idx)
    }

    pub fn contains_match(&self, re: &Regex) -> bool {
        self.position(re).is_some()
    }

    pub fn is_blank(&self, idx: usize) -> bool {
        self.lines.get(idx).is_some_and(|l| l.trim().is_empty())
    }

    pub fn replace_line(&mut self, idx: usize, line: String) {
        if let Some(slot) = self.lines.get_mut(idx) {
            *slot = line;
        }
    }

    pub fn insert_lines(&mut self, at: usize, block: Vec<String>) {
        let at = at.min(self.lines.len());
        self.lines.splice(at..at, block);
    }

    pub fn push_lines(&mut self, block: Vec<String>) {
        self.lines.extend(block);
    }

    /// Drops trailing blank lines and trailing whitespace of the last line.
    pub fn trim_end(&mut self) {
        while self.lines.last().is_some_and(|l| l.trim().is_empty()) {
            self.lines.pop();
        }
        if let Some(last) = self.lines.last_mut() {
            let trimmed_len = last.trim_end().len();
            last.truncate(trimmed_len);
        }
    }

    pub fn set_trailing_newline(&mut self, value: bool) {
        self.trailing_newline = value;
    }

    pub fn render(&self) -> String {
        let mut text = self.lines.join("\n");
        if self.trailing_newline {
            text.push('\n');
        }
        text
    }
}
