//! Catalog entry messages: a laptop and the components it is built from.

use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Laptop {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub brand: String,
    #[prost(string, tag = "3")]
    pub name: String,
    #[prost(message, optional, tag = "4")]
    pub cpu: Option<Cpu>,
    #[prost(message, optional, tag = "5")]
    pub ram: Option<Memory>,
    #[prost(message, repeated, tag = "6")]
    pub gpus: Vec<Gpu>,
    #[prost(message, repeated, tag = "7")]
    pub storages: Vec<Storage>,
    #[prost(message, optional, tag = "8")]
    pub screen: Option<Screen>,
    #[prost(message, optional, tag = "9")]
    pub keyboard: Option<Keyboard>,
    #[prost(double, tag = "10")]
    pub weight_kg: f64,
    #[prost(double, tag = "11")]
    pub price_usd: f64,
    #[prost(uint32, tag = "12")]
    pub release_year: u32,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Cpu {
    #[prost(string, tag = "1")]
    pub brand: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(uint32, tag = "3")]
    pub number_cores: u32,
    #[prost(uint32, tag = "4")]
    pub number_threads: u32,
    #[prost(double, tag = "5")]
    pub min_ghz: f64,
    #[prost(double, tag = "6")]
    pub max_ghz: f64,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Gpu {
    #[prost(string, tag = "1")]
    pub brand: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(double, tag = "3")]
    pub min_ghz: f64,
    #[prost(double, tag = "4")]
    pub max_ghz: f64,
    #[prost(message, optional, tag = "5")]
    pub memory: Option<Memory>,
}

/// An amount of memory expressed in a [`MemoryUnit`].
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Memory {
    #[prost(uint64, tag = "1")]
    pub value: u64,
    #[prost(enumeration = "MemoryUnit", tag = "2")]
    pub unit: i32,
}

impl Memory {
    pub fn new(value: u64, unit: MemoryUnit) -> Self {
        Self {
            value,
            unit: unit as i32,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(prost::Enumeration, Serialize, Deserialize)]
#[repr(i32)]
pub enum MemoryUnit {
    Unknown = 0,
    Bit = 1,
    Byte = 2,
    Kilobyte = 3,
    Megabyte = 4,
    Gigabyte = 5,
    Terabyte = 6,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Storage {
    #[prost(enumeration = "StorageDriver", tag = "1")]
    pub driver: i32,
    #[prost(message, optional, tag = "2")]
    pub memory: Option<Memory>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(prost::Enumeration, Serialize, Deserialize)]
#[repr(i32)]
pub enum StorageDriver {
    Unknown = 0,
    Hdd = 1,
    Ssd = 2,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Screen {
    #[prost(float, tag = "1")]
    pub size_inch: f32,
    #[prost(uint32, tag = "2")]
    pub width: u32,
    #[prost(uint32, tag = "3")]
    pub height: u32,
    #[prost(enumeration = "ScreenPanel", tag = "4")]
    pub panel: i32,
    #[prost(bool, tag = "5")]
    pub multitouch: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(prost::Enumeration, Serialize, Deserialize)]
#[repr(i32)]
pub enum ScreenPanel {
    Unknown = 0,
    Ips = 1,
    Oled = 2,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Keyboard {
    #[prost(enumeration = "KeyboardLayout", tag = "1")]
    pub layout: i32,
    #[prost(bool, tag = "2")]
    pub backlit: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(prost::Enumeration, Serialize, Deserialize)]
#[repr(i32)]
pub enum KeyboardLayout {
    Unknown = 0,
    Qwerty = 1,
    Qwertz = 2,
    Azerty = 3,
}

/// Lower/upper bounds used by `SearchLaptop`. Zero-valued fields impose no bound
/// except `max_price_usd`, which is always enforced.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Filter {
    #[prost(double, tag = "1")]
    pub max_price_usd: f64,
    #[prost(uint32, tag = "2")]
    pub min_cpu_cores: u32,
    #[prost(double, tag = "3")]
    pub min_cpu_ghz: f64,
    #[prost(message, optional, tag = "4")]
    pub min_ram: Option<Memory>,
}
