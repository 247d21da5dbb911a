pub mod core {
    pub mod config;
    pub mod error;
    pub mod outcome;
    pub mod profile;
    pub mod registry;
    pub mod runner;
}

pub mod workloads {
    pub mod accelerator;
    pub mod cpu;
    pub mod memory;
    pub mod ml;
    pub mod network;
    pub mod ping;
    pub mod storage;
}

pub mod reporters;
