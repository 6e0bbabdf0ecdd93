use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info};
use uuid::Uuid;

/// Events emitted by the services after a successful mutation. Delivery is
/// best-effort: a full or closed channel never fails the request that
/// produced the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// A pantry item's tracked quantity reached zero
    PantryItemDepleted { item_id: Uuid, name: String },
    /// A pantry item crossed into low stock
    PantryItemLowStock { item_id: Uuid, name: String },
    /// The dispatcher or a user added a shopping entry
    ShoppingItemAdded { item_id: Uuid, name: String },
    /// A recipe was created
    RecipeCreated(Uuid),
    /// A recipe's nutrition fields were populated from the external estimator
    RecipeEnriched(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, returning an error string on failure.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of propagating failure.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            error!("Event delivery failed: {}", e);
        }
    }
}

/// Background consumer that logs events as they arrive. Runs until every
/// sender is dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::PantryItemDepleted { item_id, name } => {
                info!(%item_id, %name, "pantry item depleted");
            }
            Event::PantryItemLowStock { item_id, name } => {
                info!(%item_id, %name, "pantry item low on stock");
            }
            Event::ShoppingItemAdded { item_id, name } => {
                info!(%item_id, %name, "shopping entry added");
            }
            Event::RecipeCreated(id) => info!(recipe_id = %id, "recipe created"),
            Event::RecipeEnriched(id) => info!(recipe_id = %id, "recipe nutrition estimated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        // Must not panic or error out.
        EventSender::new(tx)
            .send_or_log(Event::RecipeCreated(Uuid::new_v4()))
            .await;
    }

    #[tokio::test]
    async fn events_round_trip_through_channel() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        let id = Uuid::new_v4();
        sender
            .send(Event::PantryItemDepleted {
                item_id: id,
                name: "Eggs".into(),
            })
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            Event::PantryItemDepleted { item_id, name } => {
                assert_eq!(item_id, id);
                assert_eq!(name, "Eggs");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
