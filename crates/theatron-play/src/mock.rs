pub use crate::element::MediaElementMock;
