//! Data URI ユーティリティ
//!
//! 圧縮済み画像は "data:<mime>;base64,<payload>" 形式の文字列として持ち回る。
//! そのまま画像ソースとして使え、別途メタデータを必要としない。

use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// バイト列をData URIに変換
pub fn encode_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Data URIからBase64データ部分を抽出
///
/// # Arguments
/// * `data_uri` - "data:image/jpeg;base64,/9j/4AAQ..." 形式のData URI
pub fn extract_base64_from_data_uri(data_uri: &str) -> Option<&str> {
    if !data_uri.starts_with("data:") {
        return None;
    }
    data_uri.split_once(',').map(|(_, payload)| payload)
}

/// Data URIからMIMEタイプを抽出
pub fn extract_mime_type_from_data_uri(data_uri: &str) -> Option<&str> {
    let header = data_uri.strip_prefix("data:")?.split(',').next()?;
    header.split(';').next().filter(|m| !m.is_empty())
}

/// Data URIをデコードしてバイト列を取得
pub fn decode_data_uri(data_uri: &str) -> Result<Vec<u8>> {
    let payload = extract_base64_from_data_uri(data_uri)
        .ok_or_else(|| Error::InvalidDataUri("data: ヘッダまたはカンマがありません".into()))?;
    STANDARD
        .decode(payload)
        .map_err(|e| Error::InvalidDataUri(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_data_uri() {
        let uri = encode_data_uri("image/jpeg", b"abc");
        assert_eq!(uri, "data:image/jpeg;base64,YWJj");
    }

    #[test]
    fn test_extract_parts() {
        let uri = "data:image/png;base64,iVBORw0KGgo=";
        assert_eq!(extract_base64_from_data_uri(uri), Some("iVBORw0KGgo="));
        assert_eq!(extract_mime_type_from_data_uri(uri), Some("image/png"));
    }

    #[test]
    fn test_extract_rejects_plain_text() {
        assert_eq!(extract_base64_from_data_uri("hello,world"), None);
        assert_eq!(extract_mime_type_from_data_uri("hello"), None);
    }

    #[test]
    fn test_decode_data_uri() {
        let uri = encode_data_uri("image/jpeg", &[0xFF, 0xD8, 0xFF]);
        assert_eq!(decode_data_uri(&uri).unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_decode_invalid_payload() {
        let err = decode_data_uri("data:image/jpeg;base64,@@@").unwrap_err();
        assert!(matches!(err, Error::InvalidDataUri(_)));
    }
}
