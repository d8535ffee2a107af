//! # Mock Framework
//!
//! Utilities for testing code that talks to a mirror without running a
//! [`MirrorActor`](crate::mirror_framework::MirrorActor).
//!
//! Use [`create_mock_client`] to get a client, the request receiver and the
//! snapshot sender. Then use helpers like [`expect_create`] or
//! [`expect_set_status`] to assert on requests and answer them, and publish
//! snapshots to drive the synchronous reads.

use tokio::sync::{mpsc, oneshot, watch};

use crate::mirror_framework::{FrameworkError, MirrorClient, MirrorRequest, Record, Snapshot};

/// Creates a mock client plus the ends the test controls.
pub fn create_mock_client<R: Record>(
    buffer_size: usize,
) -> (MirrorClient<R>, mpsc::Receiver<MirrorRequest<R>>, watch::Sender<Snapshot<R>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    let (snapshot, snapshot_rx) = watch::channel(Snapshot::default());
    (MirrorClient::new(sender, snapshot_rx), receiver, snapshot)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<R: Record>(
    receiver: &mut mpsc::Receiver<MirrorRequest<R>>,
) -> Option<(R::Draft, oneshot::Sender<Result<R, FrameworkError>>)> {
    match receiver.recv().await {
        Some(MirrorRequest::Create { draft, respond_to }) => Some((draft, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a SetStatus request
pub async fn expect_set_status<R: Record>(
    receiver: &mut mpsc::Receiver<MirrorRequest<R>>,
) -> Option<(String, R::Status, oneshot::Sender<Result<R, FrameworkError>>)> {
    match receiver.recv().await {
        Some(MirrorRequest::SetStatus { id, status, respond_to }) => Some((id, status, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Refetch request
pub async fn expect_refetch<R: Record>(
    receiver: &mut mpsc::Receiver<MirrorRequest<R>>,
) -> Option<oneshot::Sender<Result<usize, FrameworkError>>> {
    match receiver.recv().await {
        Some(MirrorRequest::Refetch { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Publishes `rows` as a completed fetch.
pub fn publish_rows<R: Record>(snapshot: &watch::Sender<Snapshot<R>>, rows: Vec<R>) {
    snapshot.send_modify(|current| {
        current.rows = std::sync::Arc::new(rows);
        current.loading = false;
        current.error = None;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{OrderClient, ReservationClient};
    use crate::domain::{CustomerContact, OrderStatus, Reservation, ReservationStatus};
    use crate::order_store::OrderError;
    use crate::remote::StoreError;
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn reservation(id: &str) -> Reservation {
        Reservation {
            reservation_id: id.into(),
            customer: CustomerContact::new("Jo", "jo@example.com", ""),
            guests: 2,
            date: NaiveDate::from_ymd_opt(2026, 10, 30).unwrap(),
            time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            special_request: None,
            status: ReservationStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_mock_snapshot_drives_sync_reads() {
        let (mirror, _requests, snapshot) = create_mock_client::<Reservation>(4);
        let client = ReservationClient::new(mirror);
        assert!(client.is_loading());

        publish_rows(&snapshot, vec![reservation("RSV-AB12C")]);

        assert!(!client.is_loading());
        assert_eq!(client.get_reservation_by_id("RSV-AB12C").map(|r| r.guests), Some(2));
        assert_eq!(client.get_reservation_by_id("RSV-ZZZZZ"), None);
    }

    #[tokio::test]
    async fn test_update_error_maps_to_order_error() {
        let (mirror, mut requests, _snapshot) = create_mock_client(4);
        let client = OrderClient::new(mirror);

        let task = tokio::spawn(async move {
            client.update_order_status("ORD-ABC123".into(), OrderStatus::Completed).await
        });

        let (id, status, responder) = expect_set_status(&mut requests).await.expect("Expected SetStatus request");
        assert_eq!(id, "ORD-ABC123");
        assert_eq!(status, OrderStatus::Completed);
        responder.send(Err(StoreError::NotFound(id).into())).unwrap();

        let result = task.await.unwrap();
        assert_eq!(result, Err(OrderError::Update("No row matches id ORD-ABC123".into())));
    }

    #[tokio::test]
    async fn test_refetch_failure_is_reported() {
        let (mirror, mut requests, _snapshot) = create_mock_client::<Reservation>(4);
        let client = ReservationClient::new(mirror);

        let task = tokio::spawn(async move { client.refetch_reservations().await });

        let responder = expect_refetch(&mut requests).await.expect("Expected Refetch request");
        responder.send(Err(StoreError::Unavailable("offline".into()).into())).unwrap();

        assert!(task.await.unwrap().is_err());
    }
}
