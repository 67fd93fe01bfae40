//! Body assembly for `multipart/related` media uploads.
//!
//! The request body is two parts inside one boundary: the JSON encoded
//! [`Job`](crate::resources::Job), then the raw bytes of the file being
//! loaded. Since the file part is streamed, this module only builds the
//! fixed framing that goes before and after it.

use bytes::{BufMut, Bytes, BytesMut};

// the boundary marker must never appear inside either part
pub(crate) const BOUNDARY: &str = "bq_rest_multipart_boundary";

pub(crate) const CONTENT_TYPE: &str = "multipart/related; boundary=bq_rest_multipart_boundary";

const JSON_PART_HEADER: &str = "Content-Type: application/json; charset=UTF-8\r\n\r\n";
const MEDIA_PART_HEADER: &str = "Content-Type: application/octet-stream\r\n\r\n";
const HTTP_NEWLINE: &str = "\r\n";

/// Encodes everything surrounding the streamed file bytes: the leading chunk
/// ends right where the file contents belong, the trailing chunk closes out
/// the final part.
pub(crate) fn encode_framing<M>(metadata: &M) -> serde_json::Result<(Bytes, Bytes)>
where
    M: serde::Serialize,
{
    let mut leading = BytesMut::with_capacity(512);

    leading.put_slice(b"--");
    leading.put_slice(BOUNDARY.as_bytes());
    leading.put_slice(HTTP_NEWLINE.as_bytes());
    leading.put_slice(JSON_PART_HEADER.as_bytes());

    serde_json::to_writer((&mut leading).writer(), metadata)?;

    leading.put_slice(HTTP_NEWLINE.as_bytes());
    leading.put_slice(b"--");
    leading.put_slice(BOUNDARY.as_bytes());
    leading.put_slice(HTTP_NEWLINE.as_bytes());
    leading.put_slice(MEDIA_PART_HEADER.as_bytes());

    let mut trailing = BytesMut::with_capacity(HTTP_NEWLINE.len() + BOUNDARY.len() + 6);

    trailing.put_slice(HTTP_NEWLINE.as_bytes());
    trailing.put_slice(b"--");
    trailing.put_slice(BOUNDARY.as_bytes());
    trailing.put_slice(b"--");
    trailing.put_slice(HTTP_NEWLINE.as_bytes());

    Ok((leading.freeze(), trailing.freeze()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_matches_the_boundary() {
        assert_eq!(
            CONTENT_TYPE,
            format!("multipart/related; boundary={BOUNDARY}")
        );
    }

    #[test]
    fn framing_bytes_are_exact() {
        #[derive(serde::Serialize)]
        struct Metadata {
            name: &'static str,
        }

        let (leading, trailing) = encode_framing(&Metadata { name: "patients" }).unwrap();

        let expected_leading = "--bq_rest_multipart_boundary\r\n\
             Content-Type: application/json; charset=UTF-8\r\n\
             \r\n\
             {\"name\":\"patients\"}\r\n\
             --bq_rest_multipart_boundary\r\n\
             Content-Type: application/octet-stream\r\n\
             \r\n";

        assert_eq!(leading, expected_leading.as_bytes());
        assert_eq!(trailing, "\r\n--bq_rest_multipart_boundary--\r\n".as_bytes());
    }

    #[test]
    fn body_parses_back_out_of_the_framing() {
        let (leading, trailing) = encode_framing(&serde_json::json!({"a": 1})).unwrap();

        let mut body = Vec::new();
        body.extend_from_slice(&leading);
        body.extend_from_slice(b"{\"row\": 1}\n{\"row\": 2}\n");
        body.extend_from_slice(&trailing);

        let body = String::from_utf8(body).unwrap();

        // exactly three boundary markers: two part openers and the closer
        assert_eq!(body.matches(BOUNDARY).count(), 3);
        assert!(body.ends_with("--bq_rest_multipart_boundary--\r\n"));
        assert!(body.contains("{\"row\": 1}\n{\"row\": 2}\n\r\n--"));
    }
}
