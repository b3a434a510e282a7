//! Search predicate: does a laptop satisfy a [`Filter`]?

use crate::pb::{Filter, Laptop, Memory, MemoryUnit};

/// True when `laptop` is within every bound of `filter`.
pub fn matches(filter: &Filter, laptop: &Laptop) -> bool {
    if laptop.price_usd > filter.max_price_usd {
        return false;
    }

    let (cores, min_ghz) = laptop
        .cpu
        .as_ref()
        .map(|cpu| (cpu.number_cores, cpu.min_ghz))
        .unwrap_or_default();
    if cores < filter.min_cpu_cores {
        return false;
    }
    if min_ghz < filter.min_cpu_ghz {
        return false;
    }

    let ram = laptop.ram.as_ref().map(to_bits).unwrap_or(0);
    let min_ram = filter.min_ram.as_ref().map(to_bits).unwrap_or(0);
    ram >= min_ram
}

/// Normalise a memory amount to bits so different units compare directly.
pub fn to_bits(memory: &Memory) -> u64 {
    let value = memory.value;
    match memory.unit() {
        MemoryUnit::Bit => value,
        MemoryUnit::Byte => value.saturating_mul(8),
        MemoryUnit::Kilobyte => value.saturating_mul(1 << 13),
        MemoryUnit::Megabyte => value.saturating_mul(1 << 23),
        MemoryUnit::Gigabyte => value.saturating_mul(1 << 33),
        MemoryUnit::Terabyte => value.saturating_mul(1 << 43),
        MemoryUnit::Unknown => 0,
    }
}
