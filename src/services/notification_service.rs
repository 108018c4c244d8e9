// src/services/notification_service.rs

use std::sync::Arc;

use async_trait::async_trait;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{db::LedgerStore, models::events::LeaseEvent};

/// Destino dos eventos de domínio. `publish` nunca bloqueia nem falha para quem
/// chama: a transição já foi gravada quando o evento sai.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: LeaseEvent);
}

/// Transporte de saída (e-mail). Fora do núcleo.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Mailer padrão: registra a entrega no log.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        tracing::info!(%to, %subject, %body, "📧 Notificação enviada");
        Ok(())
    }
}

/// Fila de notificações. O motor publica; um worker em segundo plano consome.
#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::UnboundedSender<LeaseEvent>,
}

impl NotificationDispatcher {
    pub fn spawn(store: Arc<dyn LedgerStore>, mailer: Arc<dyn Mailer>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<LeaseEvent>();

        let worker = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                deliver(store.as_ref(), mailer.as_ref(), &event).await;
            }
            tracing::info!("Fila de notificações encerrada");
        });

        (Self { tx }, worker)
    }
}

impl EventSink for NotificationDispatcher {
    fn publish(&self, event: LeaseEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::warn!(kind = e.0.kind(), lease_id = %e.0.lease_id(), "Fila de notificações fechada; evento descartado");
        }
    }
}

// Falhas de entrega são registradas e engolidas: nunca desfazem a transição.
pub async fn deliver(store: &dyn LedgerStore, mailer: &dyn Mailer, event: &LeaseEvent) {
    let recipient = event.recipient();

    let address = match store.find_user_email(recipient).await {
        Ok(Some(address)) => address,
        Ok(None) => {
            tracing::warn!(kind = event.kind(), %recipient, "Destinatário sem e-mail cadastrado; notificação descartada");
            return;
        }
        Err(e) => {
            tracing::warn!(kind = event.kind(), %recipient, error = %e, "Falha ao buscar destinatário da notificação");
            return;
        }
    };

    if let Err(e) = mailer.send(&address, &event.subject(), &event.body()).await {
        tracing::warn!(kind = event.kind(), %recipient, error = %e, "Falha ao entregar notificação");
    }
}
