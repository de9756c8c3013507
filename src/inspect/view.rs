/// Read access to an already-received HTTP request
///
/// This is the seam between the wire protocol and the inspection logic.
/// [`crate::http::InboundRequest`] implements it for parsed requests, and tests
/// implement it with plain structs.
pub trait RequestView {
    /// Textual IP address of the peer, without the port
    fn remote_address(&self) -> String;

    /// Case-insensitive lookup of the first value of a header
    fn header(&self, name: &str) -> Option<&str>;

    /// Request method, e.g. `GET`
    fn method(&self) -> &str;

    /// Reconstructed absolute URL (`scheme://host[:port]/path`) without the query string
    fn request_url(&self) -> String;

    /// Header names in the order they were received
    fn header_names(&self) -> impl Iterator<Item = &str>;
}
