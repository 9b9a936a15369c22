use super::money::{Amount, Money};
use crate::error::{ComandaError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Longest free-text note accepted on an item.
pub const MAX_NOTE_CHARS: usize = 250;

/// Largest quantity accepted on one line. Together with [`Money::MAX`] on
/// the unit total this keeps every line total far inside `i64` cents.
pub const MAX_QUANTITY: u32 = 10_000;

pub type TableNumber = u32;

/// Store-assigned durable identifier, used for every mutation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Preparing,
    Ready,
    Delivered,
    NeedsCleaning,
    Finished,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Finished)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::NeedsCleaning => "NEEDS_CLEANING",
            OrderStatus::Finished => "FINISHED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DestinationKind {
    DineIn,
    Takeaway,
}

/// Where an order goes. Fixed once the order has been submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    DineIn { tables: BTreeSet<TableNumber> },
    Takeaway { client_name: String },
}

impl Destination {
    pub fn dine_in(tables: impl IntoIterator<Item = TableNumber>) -> Result<Self> {
        let tables: BTreeSet<TableNumber> = tables.into_iter().collect();
        if tables.is_empty() {
            return Err(ComandaError::Validation(
                "Dine-in orders need at least one table".to_string(),
            ));
        }
        Ok(Destination::DineIn { tables })
    }

    pub fn takeaway(client_name: impl Into<String>) -> Result<Self> {
        let client_name = client_name.into().trim().to_string();
        if client_name.is_empty() {
            return Err(ComandaError::Validation(
                "Takeaway orders need a client name".to_string(),
            ));
        }
        Ok(Destination::Takeaway { client_name })
    }

    pub fn kind(&self) -> DestinationKind {
        match self {
            Destination::DineIn { .. } => DestinationKind::DineIn,
            Destination::Takeaway { .. } => DestinationKind::Takeaway,
        }
    }

    /// Tables for dine-in orders, `None` for takeaway.
    pub fn tables(&self) -> Option<&BTreeSet<TableNumber>> {
        match self {
            Destination::DineIn { tables } => Some(tables),
            Destination::Takeaway { .. } => None,
        }
    }

    pub fn client_name(&self) -> Option<&str> {
        match self {
            Destination::DineIn { .. } => None,
            Destination::Takeaway { client_name } => Some(client_name),
        }
    }

    pub fn includes_table(&self, table: TableNumber) -> bool {
        self.tables().is_some_and(|tables| tables.contains(&table))
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::DineIn { tables } => {
                let joined: Vec<String> = tables.iter().map(|t| t.to_string()).collect();
                write!(f, "table:{}", joined.join("+"))
            }
            Destination::Takeaway { client_name } => write!(f, "takeaway:{client_name}"),
        }
    }
}

/// Catalog data captured when an item is added. Never re-read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub unit_price: Money,
    #[serde(default)]
    pub image: Option<String>,
}

/// An optional extra offered by the catalog for a menu item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub name: String,
    pub price: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Doneness {
    Rare,
    MediumRare,
    Medium,
    MediumWell,
    WellDone,
}

/// A line within an order.
///
/// `unit_total` caches base price plus extras at the moment the item was
/// finalized, so later catalog price changes never alter the bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub menu_item: MenuItem,
    pub quantity: u32,
    #[serde(default)]
    pub removed_ingredients: Vec<String>,
    #[serde(default)]
    pub added_ingredients: BTreeMap<String, u32>,
    #[serde(default)]
    pub doneness: Option<Doneness>,
    #[serde(default)]
    pub note: Option<String>,
    pub unit_total: Money,
}

impl OrderItem {
    pub fn builder(menu_item: MenuItem) -> OrderItemBuilder {
        OrderItemBuilder::new(menu_item)
    }

    pub fn line_total(&self) -> Money {
        self.unit_total * self.quantity
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.quantity == 0 || self.quantity > MAX_QUANTITY {
            return Err(ComandaError::Validation(format!(
                "Quantity of '{}' must be between 1 and {MAX_QUANTITY}",
                self.menu_item.name
            )));
        }
        if self.unit_total < Money::ZERO || self.unit_total > Money::MAX {
            return Err(ComandaError::Validation(format!(
                "Unit total of '{}' is out of range",
                self.menu_item.name
            )));
        }
        if let Some(note) = &self.note
            && note.chars().count() > MAX_NOTE_CHARS
        {
            return Err(ComandaError::Validation(format!(
                "Note on '{}' exceeds {MAX_NOTE_CHARS} characters",
                self.menu_item.name
            )));
        }
        Ok(())
    }
}

/// Assembles an [`OrderItem`] from catalog data and computes its unit total.
#[derive(Debug, Clone)]
pub struct OrderItemBuilder {
    menu_item: MenuItem,
    quantity: u32,
    removed: Vec<String>,
    added: Vec<(Ingredient, u32)>,
    doneness: Option<Doneness>,
    note: Option<String>,
}

impl OrderItemBuilder {
    fn new(menu_item: MenuItem) -> Self {
        Self {
            menu_item,
            quantity: 1,
            removed: Vec::new(),
            added: Vec::new(),
            doneness: None,
            note: None,
        }
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn remove(mut self, ingredient: impl Into<String>) -> Self {
        self.removed.push(ingredient.into());
        self
    }

    pub fn add(mut self, ingredient: Ingredient, quantity: u32) -> Self {
        self.added.push((ingredient, quantity));
        self
    }

    pub fn doneness(mut self, doneness: Doneness) -> Self {
        self.doneness = Some(doneness);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.note = if note.trim().is_empty() { None } else { Some(note) };
        self
    }

    /// Prices the item against the catalog data held by the builder.
    ///
    /// Extras with a quantity of zero are neither charged nor persisted.
    pub fn finalize(self) -> Result<OrderItem> {
        let out_of_range = || {
            ComandaError::Validation(format!(
                "Unit total of '{}' is out of range",
                self.menu_item.name
            ))
        };
        let mut unit_total = self.menu_item.unit_price;
        let mut added_ingredients: BTreeMap<String, u32> = BTreeMap::new();
        for (ingredient, quantity) in self.added.iter().filter(|(_, q)| *q > 0) {
            unit_total = ingredient
                .price
                .checked_mul(*quantity)
                .and_then(|extra| unit_total.checked_add(extra))
                .filter(|total| *total <= Money::MAX)
                .ok_or_else(out_of_range)?;
            let count = added_ingredients.entry(ingredient.name.clone()).or_insert(0);
            *count = count.saturating_add(*quantity);
        }

        let item = OrderItem {
            menu_item: self.menu_item,
            quantity: self.quantity,
            removed_ingredients: self.removed,
            added_ingredients,
            doneness: self.doneness,
            note: self.note,
            unit_total,
        };
        item.validate()?;
        Ok(item)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    Cash,
    Credit,
    Debit,
    #[serde(alias = "pix")]
    InstantTransfer,
}

impl FromStr for PaymentMethod {
    type Err = ComandaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "credit" => Ok(PaymentMethod::Credit),
            "debit" => Ok(PaymentMethod::Debit),
            "instant-transfer" | "pix" => Ok(PaymentMethod::InstantTransfer),
            other => Err(ComandaError::Validation(format!(
                "Unknown payment method '{other}'"
            ))),
        }
    }
}

/// A declared payment fragment. Appended, never edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitPayment {
    pub amount: Amount,
    pub method: PaymentMethod,
}

impl SplitPayment {
    pub fn new(amount: Money, method: PaymentMethod) -> Result<Self> {
        Ok(Self {
            amount: Amount::new(amount)?,
            method,
        })
    }
}

/// Audit trail written on every order when its bill is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Closure {
    pub closed_at: DateTime<Utc>,
    #[serde(default)]
    pub justification: Option<String>,
    #[serde(default)]
    pub shortfall: Money,
}

/// The unit of kitchen work, as decoded from one store record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    /// Store revision this value was read at.
    pub version: u64,
    /// Display number, the creation time in epoch milliseconds.
    pub number: u64,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub destination: Destination,
    pub items: Vec<OrderItem>,
    pub payments: Vec<SplitPayment>,
    pub closure: Option<Closure>,
}

impl Order {
    pub fn amount_owed(&self) -> Money {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    pub fn amount_paid(&self) -> Money {
        self.payments.iter().map(|p| p.amount.value()).sum()
    }

    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }
}
