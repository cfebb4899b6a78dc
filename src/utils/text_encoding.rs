// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 文本编码处理
//!
//! 将抓取到的网页字节解码为 UTF-8，并为只支持 Latin-1 字体的导出格式提供 ASCII 转写

use chardetng::EncodingDetector;
use deunicode::deunicode;
use encoding_rs::Encoding;
use tracing::debug;

/// 将响应体解码为 UTF-8 字符串
///
/// 优先使用 `Content-Type` 中声明的字符集，否则交给 chardetng 检测
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    if let Some(encoding) = content_type.and_then(charset_from_content_type) {
        let (text, _, had_errors) = encoding.decode(bytes);
        if !had_errors {
            return text.into_owned();
        }
        debug!("Declared charset {} failed, falling back to detection", encoding.name());
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    debug!("Detected encoding: {}", encoding.name());

    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    content_type
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("charset="))
        .and_then(|label| Encoding::for_label(label.trim_matches('"').as_bytes()))
}

/// 转写为 ASCII，保留换行
pub fn to_ascii(text: &str) -> String {
    text.lines().map(deunicode).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_body_utf8() {
        assert_eq!(decode_body("Größe".as_bytes(), None), "Größe");
    }

    #[test]
    fn test_decode_body_declared_latin1() {
        let bytes = [0x63, 0x61, 0x66, 0xE9];
        assert_eq!(
            decode_body(&bytes, Some("text/html; charset=ISO-8859-1")),
            "café"
        );
    }

    #[test]
    fn test_to_ascii() {
        assert_eq!(to_ascii("Skłodowska–Curie\nnaïve"), "Sklodowska-Curie\nnaive");
    }
}
