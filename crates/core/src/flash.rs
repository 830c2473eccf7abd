//! Flash messages ride in a cookie
//! between a redirect and the next page.
//! Cookie values cannot carry spaces or
//! separators, so the text is hex
//! encoded.

pub fn encode(message: &str) -> String {
  hex::encode(message.as_bytes())
}

pub fn decode(
  value: &str
) -> Option<String> {
  let bytes = hex::decode(value.trim())
    .ok()?;

  let text = String::from_utf8(bytes)
    .ok()?;

  if text.trim().is_empty() {
    return None;
  }

  Some(text)
}
