#![allow(dead_code)]

use comanda::application::engine::FloorEngine;
use comanda::config::EngineConfig;
use comanda::domain::money::Money;
use comanda::domain::order::{MenuItem, OrderItem, PaymentMethod, SplitPayment};
use comanda::infrastructure::in_memory::InMemoryOrderStore;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

pub const SCRIPT_HEADER: &str = "action,target,item,price,quantity,method,amount,note";

pub fn item(name: &str, price_cents: i64, quantity: u32) -> OrderItem {
    let menu_item = MenuItem {
        id: name.to_string(),
        name: name.to_string(),
        unit_price: Money::from_cents(price_cents),
        image: None,
    };
    OrderItem::builder(menu_item)
        .quantity(quantity)
        .finalize()
        .unwrap()
}

pub fn cash(cents: i64) -> SplitPayment {
    SplitPayment::new(Money::from_cents(cents), PaymentMethod::Cash).unwrap()
}

/// One backend store and an engine (device) on top of it.
pub fn engine_with(config: EngineConfig) -> (FloorEngine, InMemoryOrderStore) {
    let store = InMemoryOrderStore::new();
    let engine = FloorEngine::new(Arc::new(store.clone()), config);
    (engine, store)
}

pub fn engine() -> (FloorEngine, InMemoryOrderStore) {
    engine_with(EngineConfig::default())
}

/// Another device talking to the same backend.
pub fn device(store: &InMemoryOrderStore, config: EngineConfig) -> FloorEngine {
    FloorEngine::new(Arc::new(store.clone()), config)
}

pub fn script(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{SCRIPT_HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file
}
