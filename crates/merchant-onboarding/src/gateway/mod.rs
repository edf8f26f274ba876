//! Translation and network layer between in-memory applications and the backend.

pub mod codec;
mod client;
pub mod mapping;
pub mod transport;
pub mod wire;

#[cfg(test)]
pub(crate) mod tests;

pub use client::{
    Acknowledgement, ApplicationDirectory, ApplicationGateway, ApplicationSubmitter, ExportFile,
    GatewayError, SubmitReceipt,
};
pub use codec::{decode_payment_modes, EncodedPaymentModes};
pub use mapping::MappingError;
pub use transport::{ApiRequest, ApiResponse, RouterTransport, Transport, TransportError};
pub use wire::SubmissionPayload;
