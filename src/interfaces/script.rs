//! Replays floor scripts against a [`FloorEngine`].

use super::csv::script_reader::{ScriptAction, ScriptRow};
use crate::application::engine::FloorEngine;
use crate::domain::billing::BillTarget;
use crate::domain::order::{
    Destination, MenuItem, Order, OrderItem, OrderStatus, SplitPayment, TableNumber,
};
use crate::error::{ComandaError, Result};
use serde::Deserialize;
use std::str::FromStr;

/// `table:<n>[+<n>...]` or `takeaway:<client name>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum ScriptTarget {
    Tables(Vec<TableNumber>),
    Takeaway(String),
}

impl FromStr for ScriptTarget {
    type Err = ComandaError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ComandaError::Validation(format!("Invalid target '{s}'"));
        let (kind, value) = s.trim().split_once(':').ok_or_else(invalid)?;
        match kind {
            "table" => {
                let tables = value
                    .split('+')
                    .map(|t| t.trim().parse::<TableNumber>().map_err(|_| invalid()))
                    .collect::<Result<Vec<_>>>()?;
                Ok(ScriptTarget::Tables(tables))
            }
            "takeaway" if !value.trim().is_empty() => {
                Ok(ScriptTarget::Takeaway(value.trim().to_string()))
            }
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for ScriptTarget {
    type Error = ComandaError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl ScriptTarget {
    fn destination(&self) -> Result<Destination> {
        match self {
            ScriptTarget::Tables(tables) => Destination::dine_in(tables.iter().copied()),
            ScriptTarget::Takeaway(name) => Destination::takeaway(name.clone()),
        }
    }

    fn describe(&self) -> String {
        match self {
            ScriptTarget::Tables(tables) => {
                let joined: Vec<String> = tables.iter().map(|t| t.to_string()).collect();
                format!("table:{}", joined.join("+"))
            }
            ScriptTarget::Takeaway(name) => format!("takeaway:{name}"),
        }
    }
}

/// Executes script rows one at a time, the way staff devices would.
pub struct ScriptRunner {
    engine: FloorEngine,
}

impl ScriptRunner {
    pub fn new(engine: FloorEngine) -> Self {
        Self { engine }
    }

    pub async fn run(&self, row: ScriptRow) -> Result<()> {
        match row.action {
            ScriptAction::Submit => {
                let item = item_from(&row)?;
                let destination = row.target.destination()?;
                self.engine.gateway().submit(vec![item], destination).await?;
            }
            ScriptAction::Ready => {
                for order in self.orders_in(&row.target, OrderStatus::Preparing).await? {
                    self.engine.orders().mark_ready(&order.id).await?;
                }
            }
            ScriptAction::Deliver => {
                for order in self.orders_in(&row.target, OrderStatus::Ready).await? {
                    self.engine.orders().deliver(&order.id).await?;
                }
            }
            ScriptAction::Pay => {
                let amount = require(row.amount, "amount")?;
                let method = require(row.method, "method")?;
                let target = self.bill_target(&row.target).await?;
                self.engine
                    .billing()
                    .pay(target, vec![SplitPayment::new(amount, method)?])
                    .await?;
            }
            ScriptAction::Close => {
                let target = self.bill_target(&row.target).await?;
                self.engine
                    .billing()
                    .close(target, row.note.as_deref())
                    .await?;
            }
            ScriptAction::Clean => {
                let ScriptTarget::Tables(tables) = &row.target else {
                    return Err(ComandaError::Validation(
                        "Only tables can be cleaned".to_string(),
                    ));
                };
                for table in tables {
                    self.engine.billing().mark_cleaned(*table).await?;
                }
            }
        }
        Ok(())
    }

    /// Active orders for `target` currently in `status`.
    async fn orders_in(&self, target: &ScriptTarget, status: OrderStatus) -> Result<Vec<Order>> {
        let snapshot = self.engine.orders().snapshot().await?;
        let orders: Vec<Order> = match target {
            ScriptTarget::Tables(tables) => snapshot
                .orders
                .into_iter()
                .filter(|o| tables.iter().any(|t| o.destination.includes_table(*t)))
                .filter(|o| o.status == status)
                .collect(),
            ScriptTarget::Takeaway(name) => newest_takeaway(snapshot.orders, name)
                .filter(|o| o.status == status)
                .into_iter()
                .collect(),
        };
        if orders.is_empty() {
            return Err(ComandaError::NoActiveOrders(format!(
                "{} in status {status}",
                target.describe()
            )));
        }
        Ok(orders)
    }

    async fn bill_target(&self, target: &ScriptTarget) -> Result<BillTarget> {
        match target {
            ScriptTarget::Tables(tables) => match tables.as_slice() {
                [table] => Ok(BillTarget::Table(*table)),
                [] => Err(ComandaError::Validation("No table given".to_string())),
                _ => Err(ComandaError::Validation(format!(
                    "Bills are settled per table, got {}",
                    target.describe()
                ))),
            },
            ScriptTarget::Takeaway(name) => {
                let snapshot = self.engine.orders().snapshot().await?;
                newest_takeaway(snapshot.orders, name)
                    .map(|o| BillTarget::Takeaway(o.id))
                    .ok_or_else(|| ComandaError::NoActiveOrders(target.describe()))
            }
        }
    }
}

fn newest_takeaway(orders: Vec<Order>, name: &str) -> Option<Order> {
    orders
        .into_iter()
        .filter(|o| o.destination.client_name() == Some(name) && o.closure.is_none())
        .max_by_key(|o| (o.created_at, o.number))
}

fn require<T>(value: Option<T>, column: &str) -> Result<T> {
    value.ok_or_else(|| ComandaError::Validation(format!("Missing '{column}' column")))
}

fn item_from(row: &ScriptRow) -> Result<OrderItem> {
    let name = require(row.item.clone(), "item")?;
    let menu_item = MenuItem {
        id: name.to_lowercase(),
        name,
        unit_price: require(row.price, "price")?,
        image: None,
    };
    let mut builder = OrderItem::builder(menu_item).quantity(row.quantity.unwrap_or(1));
    if let Some(note) = &row.note {
        builder = builder.note(note.clone());
    }
    builder.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_targets() {
        assert_eq!(
            "table:5".parse::<ScriptTarget>().unwrap(),
            ScriptTarget::Tables(vec![5])
        );
        assert_eq!(
            "table:5+6".parse::<ScriptTarget>().unwrap(),
            ScriptTarget::Tables(vec![5, 6])
        );
        assert_eq!(
            "takeaway: Ana ".parse::<ScriptTarget>().unwrap(),
            ScriptTarget::Takeaway("Ana".to_string())
        );
        assert!("table:x".parse::<ScriptTarget>().is_err());
        assert!("takeaway:".parse::<ScriptTarget>().is_err());
        assert!("bar:1".parse::<ScriptTarget>().is_err());
    }
}
