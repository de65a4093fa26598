use wasmtime_wasi::p2::pipe::MemoryOutputPipe;

/// Upper bound on captured stdout per run. A guest that writes more than
/// this sees its writes fail rather than exhausting host memory.
const CAPTURE_LIMIT: usize = 8 * 1024 * 1024;

/// Per-run stdout sink.
///
/// A fresh capture is created for each run and installed as the guest's
/// stdout for exactly that run, so output from outside the run's duration
/// can never land in its buffer and there is no shared hook to restore on
/// the way out. Lines are read back in emission order.
pub struct OutputCapture {
    pipe: MemoryOutputPipe,
}

impl OutputCapture {
    pub fn new() -> Self {
        Self {
            pipe: MemoryOutputPipe::new(CAPTURE_LIMIT),
        }
    }

    /// Handle to install as the guest's stdout stream.
    pub fn pipe(&self) -> MemoryOutputPipe {
        self.pipe.clone()
    }

    /// Captured output split into lines, in emission order.
    ///
    /// A trailing newline does not produce an empty final line.
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.pipe.contents();
        let text = String::from_utf8_lossy(&bytes);
        let text = text.strip_suffix('\n').unwrap_or(&text);
        if text.is_empty() {
            return Vec::new();
        }
        text.split('\n').map(str::to_string).collect()
    }
}

impl Default for OutputCapture {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape `&`, `<`, and `>` so captured program output renders as text,
/// never as markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

/// Render captured lines as one escaped block, preserving order.
pub fn render_output(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| escape_html(line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html("<script>&</script>"),
            "&lt;script&gt;&amp;&lt;/script&gt;"
        );
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(escape_html("fact 3 = 6"), "fact 3 = 6");
    }

    #[test]
    fn render_preserves_line_order() {
        let lines = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(render_output(&lines), "a\nb\nc");
    }

    #[test]
    fn render_escapes_each_line() {
        let lines = vec!["1 < 2".to_string(), "2 > 1".to_string()];
        assert_eq!(render_output(&lines), "1 &lt; 2\n2 &gt; 1");
    }

    #[test]
    fn empty_capture_has_no_lines() {
        let capture = OutputCapture::new();
        assert!(capture.lines().is_empty());
    }
}
