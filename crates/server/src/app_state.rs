use crate::relay::Relay;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) relay: Relay,
}
