use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    domain::{click::ClickEvent, game::GameRepository, seller::SellerRepository},
    ports::click::ClickSignalPort,
};

/// Sending half of the click channel, handed to the use cases that count views.
#[derive(Clone)]
pub struct ChannelClickSignal {
    sender: mpsc::UnboundedSender<ClickEvent>,
}

impl ClickSignalPort for ChannelClickSignal {
    fn emit(&self, event: ClickEvent) {
        if self.sender.send(event).is_err() {
            log::warn!("Click counter stopped, dropping {:?}", event);
        }
    }
}

pub fn click_channel() -> (ChannelClickSignal, mpsc::UnboundedReceiver<ClickEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (ChannelClickSignal { sender }, receiver)
}

pub struct ClickCounterJob<S: SellerRepository, G: GameRepository> {
    receiver: mpsc::UnboundedReceiver<ClickEvent>,
    seller_repository: Arc<S>,
    game_repository: Arc<G>,
}

impl<S: SellerRepository + Send + Sync + 'static, G: GameRepository + Send + Sync + 'static>
    ClickCounterJob<S, G>
{
    pub fn new(
        receiver: mpsc::UnboundedReceiver<ClickEvent>,
        seller_repository: Arc<S>,
        game_repository: Arc<G>,
    ) -> Self {
        Self {
            receiver,
            seller_repository,
            game_repository,
        }
    }

    pub async fn handle(&self, event: ClickEvent) {
        let result = match event {
            ClickEvent::GameViewed(game_id) => self.game_repository.increment_clicks(game_id).await,
            ClickEvent::SellerProfileViewed(seller_id) => {
                self.seller_repository.increment_clicks(seller_id).await
            }
        };
        if let Err(e) = result {
            log::error!("Failed to count {:?}: {}", event, e);
        }
    }

    /// Runs until every sender is dropped.
    pub async fn run(mut self) {
        while let Some(event) = self.receiver.recv().await {
            self.handle(event).await;
        }
        log::info!("Click counter stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{GameId, SellerId},
        testing::InMemoryStore,
    };

    #[tokio::test]
    async fn test_counts_clicks_until_senders_are_dropped() {
        let store = Arc::new(InMemoryStore::new());
        let offer = store.seed_offer().await;
        let (signal, receiver) = click_channel();
        let job = ClickCounterJob::new(receiver, store.clone(), store.clone());

        signal.emit(ClickEvent::GameViewed(offer.game.id));
        signal.emit(ClickEvent::GameViewed(offer.game.id));
        signal.emit(ClickEvent::SellerProfileViewed(offer.seller.id));
        signal.emit(ClickEvent::GameViewed(GameId(999)));
        signal.emit(ClickEvent::SellerProfileViewed(SellerId(999)));
        drop(signal);
        job.run().await;

        assert_eq!(store.get_game(offer.game.id).await.unwrap().clicks, 2);
        assert_eq!(store.get_seller(offer.seller.id).await.unwrap().clicks, 1);
    }
}
