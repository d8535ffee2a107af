/// Generates the methods every table client shares: the synchronous by-id
/// lookup, the full list, status updates and forced reloads.
///
/// `$snake` names one record (`order`), `$plural` the collection (`orders`).
macro_rules! impl_mirror_methods {
    ($client_name:ident, $record:ty, $error:ty, $snake:ident, $plural:ident) => {
        paste::paste! {
            impl $client_name {
                /// Looks `id` up in the mirrored rows. May trail the remote
                /// table by one refresh; an unknown id is `None`.
                #[tracing::instrument(skip(self))]
                pub fn [<get_ $snake _by_id>](&self, id: &str) -> Option<$record> {
                    let found = self.inner.get(id);
                    if found.is_none() {
                        tracing::debug!("Not in mirrored rows");
                    }
                    found
                }

                /// All mirrored rows, newest first.
                pub fn $plural(&self) -> std::sync::Arc<Vec<$record>> {
                    self.inner.rows()
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<update_ $snake _status>](
                    &self,
                    id: String,
                    status: <$record as $crate::mirror_framework::Record>::Status,
                ) -> Result<$record, $error> {
                    tracing::debug!("Sending request");
                    self.inner.set_status(id, status).await.map_err(<$error>::on_update)
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<refetch_ $plural>](&self) -> Result<usize, $error> {
                    tracing::debug!("Sending request");
                    self.inner.refetch().await.map_err(<$error>::on_fetch)
                }

                /// Message of the last failed background fetch, if the latest
                /// one failed.
                pub fn fetch_error(&self) -> Option<String> {
                    self.inner.snapshot().error
                }

                pub fn is_loading(&self) -> bool {
                    self.inner.snapshot().loading
                }

                /// Waits for the initial fetch to settle.
                pub async fn loaded(&self) -> Result<(), $error> {
                    self.inner.loaded().await.map(|_| ()).map_err(<$error>::on_fetch)
                }

                pub async fn shutdown(&self) -> Result<(), $error> {
                    self.inner.shutdown().await.map_err(<$error>::on_fetch)
                }
            }
        }
    };
}

macro_rules! impl_client_new {
    ($client_name:ident, $record:ty) => {
        impl $client_name {
            pub fn new(inner: $crate::mirror_framework::MirrorClient<$record>) -> Self {
                Self { inner }
            }
        }
    };
}

macro_rules! impl_mirror_client {
    ($client_name:ident, $record:ty, $error:ty, $snake:ident, $plural:ident) => {
        impl_client_new!($client_name, $record);
        impl_mirror_methods!($client_name, $record, $error, $snake, $plural);
    };
}
