//! CLI Commands

mod checksum;
mod demo;
mod keygen;

pub use checksum::ChecksumDemoCommand;
pub use demo::DemoCommand;
pub use keygen::KeygenCommand;
