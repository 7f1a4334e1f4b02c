use esp_idf_svc::{
    http::{
        client::{Configuration, EspHttpConnection},
        Method,
    },
    io::Write,
};
use sensor_reporter_core::{
    http_header::{add_body_len_header, HttpHeader, HttpHeaderType},
    Transport,
};

#[derive(Debug)]
pub enum HttpError {
    InitializationError,
    RequestError,
    ResponseError,
}

/// Abstraction to simply make HTTP requests as a client. Dropping the
/// client closes its connection.
pub struct HttpClient {
    connection: EspHttpConnection,
}

impl HttpClient {
    /// Creates a new HttpClient with the default connection configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the new `HttpClient` instance, or an `HttpError` if the
    /// initialization failed.
    ///
    /// # Errors
    ///
    /// - `HttpError::InitializationError`: If the creation of the Http connection fails
    pub fn new() -> Result<Self, HttpError> {
        let config: &Configuration = &Default::default();
        let connection =
            EspHttpConnection::new(config).map_err(|_| HttpError::InitializationError)?;
        Ok(HttpClient { connection })
    }

    /// Does an HTTP POST of `body` on the desired uri with the designated headers.
    /// A `Content-Length` header is added if the caller did not set one.
    ///
    /// # Arguments
    ///
    /// - `uri`: Full URI of the request.
    /// - `headers`: Headers to send along.
    /// - `body`: The request body.
    ///
    /// # Returns
    ///
    /// A `Result` with Ok once the request and its body were written.
    ///
    /// # Errors
    ///
    /// - `HttpError::RequestError`: If an error occurs while creating or sending the request.
    pub fn post(&mut self, uri: &str, mut headers: Vec<HttpHeader>, body: &str) -> Result<(), HttpError> {
        add_body_len_header(&mut headers, Some(body.len()));

        let raw_headers: Vec<(&str, &str)> = headers
            .iter()
            .map(|header| (header.name(), header.value()))
            .collect();
        self.connection
            .initiate_request(Method::Post, uri, &raw_headers)
            .map_err(|_| HttpError::RequestError)?;
        self.connection
            .write_all(body.as_bytes())
            .map_err(|_| HttpError::RequestError)
    }

    /// Finishes the last request and waits for the status line of its response.
    ///
    /// # Returns
    ///
    /// A `Result` containing the response status code.
    ///
    /// # Errors
    ///
    /// - `HttpError::ResponseError`: If the server did not answer.
    pub fn response_status(&mut self) -> Result<u16, HttpError> {
        self.connection
            .initiate_response()
            .map_err(|_| HttpError::ResponseError)?;
        Ok(self.connection.status())
    }
}

/// Transport that opens a fresh connection for every post and closes it as
/// soon as the status code arrives. The response body is never read.
#[derive(Debug, Default)]
pub struct OneShotHttp;

impl Transport for OneShotHttp {
    type Error = HttpError;

    fn post(&mut self, uri: &str, content_type: &str, body: &str) -> Result<u16, HttpError> {
        let mut client = HttpClient::new()?;
        let header = HttpHeader::new(HttpHeaderType::ContentType, content_type);
        client.post(uri, vec![header], body)?;
        client.response_status()
    }
}
