//! LaptopServer integration tests: drives the operations in-process,
//! without a network transport.

mod rate;
