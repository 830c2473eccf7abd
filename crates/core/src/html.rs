/// Escape text for HTML element
/// content and quoted attribute values.
pub fn escape(raw: &str) -> String {
  let mut out =
    String::with_capacity(raw.len());

  for c in raw.chars() {
    match c {
      | '&' => out.push_str("&amp;"),
      | '<' => out.push_str("&lt;"),
      | '>' => out.push_str("&gt;"),
      | '"' => out.push_str("&quot;"),
      | '\'' => out.push_str("&#39;"),
      | other => out.push(other)
    }
  }

  out
}

/// Plain user text as HTML: escaped,
/// with line breaks preserved.
pub fn text_to_html(
  raw: &str
) -> String {
  escape(raw.trim())
    .replace("\r\n", "\n")
    .replace('\n', "<br>\n")
}

/// Percent-encode the characters that
/// could end a quoted CSS `url(...)`.
pub fn css_url(raw: &str) -> String {
  let mut out =
    String::with_capacity(raw.len());

  for c in raw.trim().chars() {
    match c {
      | '\'' => out.push_str("%27"),
      | '"' => out.push_str("%22"),
      | '(' => out.push_str("%28"),
      | ')' => out.push_str("%29"),
      | '\\' => out.push_str("%5C"),
      | c if c.is_whitespace()
        || c.is_control() =>
      {
        let mut buf = [0u8; 4];
        for byte in
          c.encode_utf8(&mut buf).bytes()
        {
          out.push_str(&format!(
            "%{byte:02X}"
          ));
        }
      }
      | other => out.push(other)
    }
  }

  out
}
