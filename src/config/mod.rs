//! Filter configuration: raw settings in, typed config out.

mod client;
mod invocation;
mod settings;
mod template;

pub use client::{ClientConfig, DecryptSecret, NoopDecrypt, Protocol};
pub use invocation::{
    CredentialStrategy, InvocationConfig, InvocationType, LogType, DEFAULT_MEMORY_SIZE_MB,
    DEFAULT_RETRY_DELAY_MS,
};
pub use settings::RawSettings;
pub use template::Template;
