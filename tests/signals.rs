use countdown_dial::shutdown_signal;
use futures::poll;
use signal_hook::{consts::SIGINT, low_level::raise};

#[tokio::test]
async fn reports_which_signal_arrived() {
    let mut waiting = Box::pin(shutdown_signal());
    // first poll installs the handler
    assert!(poll!(&mut waiting).is_pending());

    raise(SIGINT).unwrap();
    assert_eq!(waiting.await, SIGINT);
}
