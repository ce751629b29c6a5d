use super::*;

#[test]
fn parses_upload_and_drop() {
    assert_eq!(
        parse_command("upload invoice.pdf"),
        Ok(ShellCommand::Action(UserAction::FileChosen(PathBuf::from(
            "invoice.pdf"
        ))))
    );
    assert_eq!(
        parse_command("  drop a.png b.png "),
        Ok(ShellCommand::Action(UserAction::FilesDropped(vec![
            PathBuf::from("a.png"),
            PathBuf::from("b.png"),
        ])))
    );
    assert_eq!(
        parse_command("drop"),
        Ok(ShellCommand::Action(UserAction::FilesDropped(Vec::new())))
    );
}

#[test]
fn upload_requires_exactly_one_path() {
    assert!(parse_command("upload").is_err());
    assert!(parse_command("upload a.pdf b.pdf").is_err());
}

#[test]
fn parses_view_index() {
    assert_eq!(
        parse_command("view 2"),
        Ok(ShellCommand::Action(UserAction::HistoryEntryClicked(2)))
    );
    let err = parse_command("view two").expect_err("not a number");
    assert!(err.contains("two"));
}

#[test]
fn parses_simple_commands() {
    assert_eq!(parse_command(""), Ok(ShellCommand::Empty));
    assert_eq!(parse_command("history"), Ok(ShellCommand::History));
    assert_eq!(parse_command("log"), Ok(ShellCommand::Log));
    assert_eq!(parse_command("?"), Ok(ShellCommand::Help));
    assert_eq!(parse_command("exit"), Ok(ShellCommand::Quit));
    assert!(parse_command("frobnicate").is_err());
}

#[tokio::test]
async fn follower_stops_after_flushing() {
    let session = Session::new();
    let (stop_tx, stop_rx) = oneshot::channel();
    let follower = spawn_follower(Arc::clone(&session), session.subscribe_events(), stop_rx);

    session
        .append("Uploading a.pdf...", shared::domain::Origin::User, None)
        .await;
    stop_tx.send(()).expect("follower alive");

    tokio::time::timeout(std::time::Duration::from_secs(5), follower)
        .await
        .expect("follower stops")
        .expect("follower task");
}
