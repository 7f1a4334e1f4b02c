/// Simple abstraction of a header used for HTTP requests. It contains:
/// - `header_type`: The type of header to be used
/// - `value`: The value associated to the header
#[derive(Debug, PartialEq, Eq)]
pub struct HttpHeader {
    header_type: HttpHeaderType,
    value: String,
}

impl HttpHeader {
    /// Creates a new HttpHeader
    ///
    /// # Arguments
    ///
    /// - `header_type`: The type of header to be used
    /// - `value`: The value associated to the header
    ///
    /// # Returns
    ///
    /// The new HttpHeader instance
    pub fn new(header_type: HttpHeaderType, value: impl Into<String>) -> Self {
        HttpHeader {
            header_type,
            value: value.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.header_type.as_str()
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// HTTP headers the reporter sends.
#[derive(Debug, PartialEq, Eq)]
pub enum HttpHeaderType {
    ContentLength,
    ContentType,
}

impl HttpHeaderType {
    /// Returns the header name as it goes on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpHeaderType::ContentLength => "Content-Length",
            HttpHeaderType::ContentType => "Content-Type",
        }
    }
}

/// Checks whether a `Content-Length` header is among the headers, if not it adds it.
///
/// # Arguments
///
/// - `headers`: The headers of the request.
/// - `body_len`: The length of the request body, if there is one.
pub fn add_body_len_header(headers: &mut Vec<HttpHeader>, body_len: Option<usize>) {
    if let Some(body_len) = body_len {
        let has_content_length = headers
            .iter()
            .any(|header| header.header_type == HttpHeaderType::ContentLength);

        if !has_content_length {
            headers.push(HttpHeader::new(
                HttpHeaderType::ContentLength,
                body_len.to_string(),
            ));
        }
    }
}
