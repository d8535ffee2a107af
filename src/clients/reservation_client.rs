use tracing::{debug, info, instrument};

use crate::domain::{Reservation, ReservationCounts, ReservationDraft};
use crate::mirror_framework::MirrorClient;
use crate::reservation_store::ReservationError;

/// Client for the reservation mirror.
#[derive(Clone)]
pub struct ReservationClient {
    inner: MirrorClient<Reservation>,
}

impl_mirror_client!(ReservationClient, Reservation, ReservationError, reservation, reservations);

impl ReservationClient {
    /// Books a table and returns the `RSV-` id. New bookings are `Pending`.
    #[instrument(skip(self, draft), fields(guests = draft.guests, date = %draft.date))]
    pub async fn add_reservation(&self, draft: ReservationDraft) -> Result<String, ReservationError> {
        debug!("Sending request");
        let reservation = self.inner.create(draft).await.map_err(ReservationError::on_insert)?;
        info!(reservation_id = %reservation.reservation_id, "Reservation requested");
        Ok(reservation.reservation_id)
    }

    pub fn get_reservations_count(&self) -> ReservationCounts {
        ReservationCounts::tally(self.inner.rows().iter())
    }
}
