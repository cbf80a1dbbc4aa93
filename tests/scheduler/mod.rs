// Integration tests for the polling scheduler core.
//
// The real PollingManager runs against in-memory stand-ins for the
// persistence port and the feed client, so no database or network is
// needed. Tests that assert timing use tokio's paused clock and spend no
// wall-clock time sleeping.

mod test_fetch_retry;
mod test_polling_manager;
mod test_start_all;
