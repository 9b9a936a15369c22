mod common;

use comanda::application::engine::FloorEngine;
use comanda::config::EngineConfig;
use comanda::domain::order::{Destination, OrderStatus};
use comanda::domain::ports::{OrderStore, OrderStoreBox, SharedOrderStore};
use comanda::infrastructure::in_memory::InMemoryOrderStore;
use common::item;
use std::sync::Arc;

fn boxed_store() -> OrderStoreBox {
    Box::new(InMemoryOrderStore::new())
}

#[tokio::test]
async fn test_engine_over_trait_object() {
    let store: SharedOrderStore = Arc::from(boxed_store());
    let engine = FloorEngine::new(store.clone(), EngineConfig::default());

    let handle = tokio::spawn({
        let engine = engine.clone();
        async move {
            engine
                .orders()
                .create(&Destination::dine_in([1]).unwrap(), vec![item("A", 100, 1)])
                .await
        }
    });
    let id = handle.await.unwrap().unwrap();

    let documents = store.active().await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].id, id);
    assert_eq!(engine.orders().get(&id).await.unwrap().status, OrderStatus::Preparing);
}
