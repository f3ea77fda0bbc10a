use super::mock::MockTransport;
use super::resolver::{is_group_id, is_phone_number, is_username, is_uuid};
use super::triggers::{of_kind, regex_triggered, triggered, triggered_with_case};
use super::*;
use async_trait::async_trait;
use serde_json::json;
use signalbot_core::{
    group::Group,
    message::{Message, MessageType, OutgoingMessage, ReceiptType},
};
use signalbot_storage::InMemoryStorage;
use std::sync::atomic::{AtomicUsize, Ordering};

const SENDER: &str = "+490123456789";
const SENDER_UUID: &str = "b6a4d1c2-55f0-4d0e-9f3b-7c1e2a9d8e11";
const CHAT_ID: &str = "group.OyZzqio1xDmYiLsQ1VsqRcUFOU4tK2TcECmYt2KeozHJwglMBHAPS7jlkrm=";
const CHAT_INTERNAL: &str = "Mg8LQTdaZJs8+LJCrtQgblqHx+xI2dX9JJ8hVA2kqt8=";

fn group_id(fill: char) -> String {
    format!("group.{}=", fill.to_string().repeat(59))
}

fn group(id: &str, internal_id: &str, name: &str) -> Group {
    Group {
        id: id.to_string(),
        internal_id: internal_id.to_string(),
        name: name.to_string(),
    }
}

fn chat_testing() -> Group {
    group(CHAT_ID, CHAT_INTERNAL, "chat_testing")
}

/// Sends a fixed text back to the chat.
struct Reply(&'static str);

#[async_trait]
impl Command for Reply {
    async fn handle(&self, ctx: &Context) -> anyhow::Result<()> {
        ctx.send(self.0).await?;
        Ok(())
    }
}

struct Failing;

#[async_trait]
impl Command for Failing {
    async fn handle(&self, _ctx: &Context) -> anyhow::Result<()> {
        anyhow::bail!("handler exploded")
    }
}

struct Panicking;

#[async_trait]
impl Command for Panicking {
    async fn handle(&self, _ctx: &Context) -> anyhow::Result<()> {
        panic!("handler panicked on purpose")
    }
}

fn payload(text: &str, group: Option<&str>) -> String {
    let mut data = json!({ "timestamp": 1632576001632i64, "message": text });
    if let Some(group) = group {
        data["groupInfo"] = json!({ "groupId": group, "type": "DELIVER" });
    }
    json!({
        "envelope": {
            "source": SENDER,
            "sourceNumber": SENDER,
            "sourceUuid": SENDER_UUID,
            "timestamp": 1632576001632i64,
            "dataMessage": data,
        }
    })
    .to_string()
}

fn private_message(text: &str) -> Message {
    let mut message = Message::new(SENDER, SENDER_UUID, 1632576001632, MessageType::Data);
    message.text = Some(text.to_string());
    message
}

fn group_message(text: &str, internal_id: &str) -> Message {
    let mut message = private_message(text);
    message.group = Some(internal_id.to_string());
    message
}

fn bot_with(transport: &Arc<MockTransport>) -> Bot {
    Bot::new(
        Config::default(),
        Arc::clone(transport),
        Arc::new(InMemoryStorage::new()),
    )
}

async fn eventually(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

// --- Address validators ---

#[test]
fn test_phone_numbers() {
    assert!(is_phone_number("+490123456789"));
    assert!(is_phone_number("+14155550123"));
    assert!(!is_phone_number("490123456789"));
    assert!(!is_phone_number("+0123456789"));
    assert!(!is_phone_number("+49 0123 456789"));
    assert!(!is_phone_number("+123"));
    // Syntax only: unassigned but well-formed numbers are accepted.
    assert!(is_phone_number("+1000000"));
    assert!(!is_phone_number("+1234567890123456"));
}

#[test]
fn test_uuids() {
    assert!(is_uuid(SENDER_UUID));
    assert!(!is_uuid("asdf"));
    assert!(!is_uuid(""));
}

#[test]
fn test_usernames() {
    for valid in ["UserName.99", "user_name.42", "abc.123456789", "Under_Score99.10"] {
        assert!(is_username(valid), "{valid} should be a username");
    }
    for invalid in [
        "UserName.0",
        "UserName99",
        "Us.99",
        "user.01",
        "user.00",
        "user.000000",
        "user.1",
        "user.1234567890",
        "user",
        "us-er.12",
        "user.12a",
        ".12",
    ] {
        assert!(!is_username(invalid), "{invalid} should not be a username");
    }
}

#[test]
fn test_group_ids() {
    assert!(is_group_id(CHAT_ID));
    assert!(is_group_id(&group_id('A')));
    assert!(!is_group_id(CHAT_INTERNAL));
    assert!(!is_group_id("group.group_secret1="));
    assert!(!is_group_id(&CHAT_ID[..CHAT_ID.len() - 1]));
}

// --- Triggers ---

#[test]
fn test_triggered_ignores_case_by_default() {
    let ping = triggered(&["ping"]);
    assert!(ping(&private_message("ping")));
    assert!(ping(&private_message("PING")));
    assert!(!ping(&private_message("ping pong")));
    assert!(!ping(&Message::new(SENDER, SENDER_UUID, 1, MessageType::Data)));
}

#[test]
fn test_triggered_case_sensitive() {
    let ping = triggered_with_case(&["ping"], true);
    assert!(ping(&private_message("ping")));
    assert!(!ping(&private_message("PING")));
}

#[test]
fn test_regex_triggered() {
    let when = regex_triggered(&[r"^remind me", r"\btomorrow\b"]).unwrap();
    assert!(when(&private_message("remind me at 5")));
    assert!(when(&private_message("see you tomorrow!")));
    assert!(!when(&private_message("tomorrowland")));
    assert!(regex_triggered(&["("]).is_err());
}

#[test]
fn test_of_kind() {
    let deletes = of_kind(MessageType::Delete);
    assert!(deletes(&Message::new(SENDER, SENDER_UUID, 1, MessageType::Delete)));
    assert!(!deletes(&private_message("hi")));
}

// --- Directory and resolver ---

#[test]
fn test_group_index_duplicate_names_use_first() {
    let first = group(&group_id('A'), "a=", "team");
    let second = group(&group_id('B'), "b=", "team");
    let index = GroupIndex::new(vec![first.clone(), second.clone()]);
    assert_eq!(index.len(), 2);
    assert_eq!(index.by_name("team"), Some(&first));
    assert_eq!(index.by_internal_id("b="), Some(&second));
    assert_eq!(index.by_id(&group_id('B')), Some(&second));
    assert!(index.by_name("nobody").is_none());
}

#[tokio::test]
async fn test_directory_refresh_replaces_index() {
    let transport = MockTransport::with_groups(vec![chat_testing()]);
    let directory = GroupDirectory::new(transport.clone());
    assert!(directory.snapshot().is_empty());

    assert_eq!(directory.refresh().await.unwrap(), 1);
    let before = directory.snapshot();
    assert_eq!(directory.by_name("chat_testing").unwrap().id, CHAT_ID);

    transport
        .groups
        .lock()
        .unwrap()
        .push(group(&group_id('C'), "c=", "other"));
    assert_eq!(directory.refresh().await.unwrap(), 2);

    // Old snapshots stay valid after a swap.
    assert_eq!(before.len(), 1);
    assert_eq!(directory.snapshot().len(), 2);
    assert_eq!(transport.list_calls(), 2);
}

#[tokio::test]
async fn test_resolver_order() {
    let transport = MockTransport::with_groups(vec![chat_testing()]);
    let directory = Arc::new(GroupDirectory::new(transport));
    directory.refresh().await.unwrap();
    let resolver = Resolver::new(directory);

    assert_eq!(resolver.resolve(SENDER).unwrap(), SENDER);
    assert_eq!(resolver.resolve(SENDER_UUID).unwrap(), SENDER_UUID);
    assert_eq!(resolver.resolve("user.42").unwrap(), "user.42");
    assert_eq!(resolver.resolve(CHAT_ID).unwrap(), CHAT_ID);
    assert_eq!(resolver.resolve(CHAT_INTERNAL).unwrap(), CHAT_ID);
    assert_eq!(resolver.resolve("chat_testing").unwrap(), CHAT_ID);
    // Unknown public ids still pass through.
    assert_eq!(resolver.resolve(&group_id('Z')).unwrap(), group_id('Z'));
}

#[tokio::test]
async fn test_resolver_unresolvable() {
    let transport = MockTransport::with_groups(vec![chat_testing()]);
    let directory = Arc::new(GroupDirectory::new(transport));
    directory.refresh().await.unwrap();
    let resolver = Resolver::new(directory);

    let err = resolver.resolve("nobody in particular").unwrap_err();
    assert!(matches!(err, SignalError::UnresolvableReceiver(ref r) if r == "nobody in particular"));
}

// --- Registry ---

async fn resolved_directory() -> GroupDirectory {
    let transport = MockTransport::with_groups(vec![chat_testing()]);
    let directory = GroupDirectory::new(transport);
    directory.refresh().await.unwrap();
    directory
}

#[tokio::test]
async fn test_registry_resolves_names_and_drops_unknown() {
    let directory = resolved_directory().await;
    let mut registry = Registry::new();
    registry.register(
        Arc::new(Reply("x")),
        ContactFilter::None,
        GroupFilter::List(vec![
            "chat_testing".into(),
            group_id('Q'),
            "no such group".into(),
        ]),
        None,
    );
    registry.resolve(&directory);

    let entry = &registry.entries()[0];
    assert_eq!(
        entry.resolved_groups(),
        &GroupFilter::List(vec![CHAT_ID.to_string(), group_id('Q')])
    );
    // The registered filter is kept as given.
    assert!(matches!(&entry.groups, GroupFilter::List(items) if items.len() == 3));
}

#[tokio::test]
async fn test_registry_contact_and_group_gates() {
    let directory = resolved_directory().await;
    let mut registry = Registry::new();
    registry.register(
        Arc::new(Reply("contacts")),
        ContactFilter::List(vec![SENDER.into()]),
        GroupFilter::None,
        None,
    );
    registry.register(
        Arc::new(Reply("groups")),
        ContactFilter::None,
        GroupFilter::List(vec!["chat_testing".into()]),
        Some(triggered(&["ping"])),
    );
    registry.register(
        Arc::new(Reply("everyone")),
        ContactFilter::All,
        GroupFilter::All,
        None,
    );
    registry.resolve(&directory);
    let index = directory.snapshot();

    let names = |message: &Message| -> Vec<String> {
        registry
            .entries()
            .iter()
            .filter(|e| e.matches(message, &index))
            .map(|e| match e.contacts {
                ContactFilter::List(_) => "contacts".to_string(),
                ContactFilter::None => "groups".to_string(),
                ContactFilter::All => "everyone".to_string(),
            })
            .collect()
    };

    assert_eq!(names(&private_message("hi")), ["contacts", "everyone"]);

    let mut stranger = private_message("hi");
    stranger.source = "+14155550123".into();
    assert_eq!(names(&stranger), ["everyone"]);

    assert_eq!(
        names(&group_message("ping", CHAT_INTERNAL)),
        ["groups", "everyone"]
    );
    assert_eq!(names(&group_message("pong", CHAT_INTERNAL)), ["everyone"]);
    // Group the directory does not know: only "all groups" entries match.
    assert_eq!(names(&group_message("ping", "unknown=")), ["everyone"]);

    assert_eq!(registry.matching(&private_message("hi"), &index).len(), 2);
}

#[test]
fn test_registry_descriptions_skip_undescribed() {
    struct Described;

    #[async_trait]
    impl Command for Described {
        async fn handle(&self, _ctx: &Context) -> anyhow::Result<()> {
            Ok(())
        }

        fn describe(&self) -> Option<String> {
            Some("described: does things".into())
        }
    }

    let mut registry = Registry::new();
    registry.register(Arc::new(Reply("x")), ContactFilter::All, GroupFilter::All, None);
    registry.register(Arc::new(Described), ContactFilter::All, GroupFilter::All, None);
    assert_eq!(registry.descriptions(), ["described: does things"]);
    assert_eq!(registry.entries()[1].command.name(), "Described");
}

// --- Supervisor ---

#[test]
fn test_backoff_doubles_to_max() {
    let mut backoff = Backoff::new(
        Duration::from_secs(1),
        Duration::from_secs(300),
        Duration::from_secs(180),
    );
    let delays: Vec<u64> = (0..11)
        .map(|_| backoff.next_delay(Duration::ZERO).as_secs())
        .collect();
    assert_eq!(delays, [1, 2, 4, 8, 16, 32, 64, 128, 256, 300, 300]);
}

#[test]
fn test_backoff_resets_after_long_run() {
    let mut backoff = Backoff::default();
    for _ in 0..5 {
        backoff.next_delay(Duration::from_secs(1));
    }
    assert_eq!(backoff.next_delay(Duration::from_secs(180)).as_secs(), 1);
    assert_eq!(backoff.next_delay(Duration::ZERO).as_secs(), 2);
    assert_eq!(backoff.next_delay(Duration::ZERO).as_secs(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_run_supervised_retries_until_success() {
    let attempts = AtomicUsize::new(0);
    let attempts = &attempts;
    let cancel = CancellationToken::new();
    let started = tokio::time::Instant::now();

    let result = run_supervised("flaky", &cancel, Backoff::default(), || async move {
        if attempts.fetch_add(1, Ordering::SeqCst) < 3 {
            Err("not yet")
        } else {
            Ok(42)
        }
    })
    .await;

    assert_eq!(result, Some(42));
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
    // 1s + 2s + 4s of backoff.
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(7) && waited < Duration::from_secs(8));
}

#[tokio::test(start_paused = true)]
async fn test_run_supervised_cancelled_while_running() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        trigger.cancel();
    });

    let result = run_supervised("forever", &cancel, Backoff::default(), || {
        std::future::pending::<Result<(), String>>()
    })
    .await;
    assert_eq!(result, None);
}

#[tokio::test(start_paused = true)]
async fn test_run_supervised_cancelled_during_backoff() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        trigger.cancel();
    });

    let attempts = AtomicUsize::new(0);
    let attempts = &attempts;
    let started = tokio::time::Instant::now();
    let backoff = Backoff::new(
        Duration::from_secs(60),
        Duration::from_secs(300),
        Duration::from_secs(180),
    );
    let result = run_supervised("broken", &cancel, backoff, || async move {
        attempts.fetch_add(1, Ordering::SeqCst);
        Err::<(), _>("always fails")
    })
    .await;

    assert_eq!(result, None);
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert!(started.elapsed() < Duration::from_secs(60));
}

// --- Version check ---

#[test]
fn test_parse_version() {
    assert_eq!(parse_version("0.95.0"), Some((0, 95, 0)));
    assert_eq!(parse_version("v0.97.1"), Some((0, 97, 1)));
    assert_eq!(parse_version("0.95.0-dev"), Some((0, 95, 0)));
    assert_eq!(parse_version("1.2"), Some((1, 2, 0)));
    assert_eq!(parse_version("latest"), None);
    assert!(parse_version("0.94.9").unwrap() < MIN_SERVICE_VERSION);
}

#[tokio::test]
async fn test_start_rejects_old_service() {
    let transport = MockTransport::with_groups(vec![]);
    *transport.version.lock().unwrap() = Some("0.90.0".into());
    let bot = bot_with(&transport);

    let err = bot.start(&CancellationToken::new()).await.unwrap_err();
    assert!(err.to_string().contains("Incompatible"), "{err}");
    assert_eq!(bot.dispatcher().state(), PipelineState::Stopped);
    assert_eq!(transport.list_calls(), 0);
}

// --- Pipeline ---

#[tokio::test]
async fn test_one_message_two_handlers() {
    let transport = MockTransport::with_groups(vec![chat_testing()]);
    let bot = bot_with(&transport);
    bot.register(Reply("first"), ContactFilter::All, GroupFilter::All, None)
        .await;
    bot.register(Reply("second"), ContactFilter::All, GroupFilter::All, None)
        .await;

    let shutdown = CancellationToken::new();
    bot.start(&shutdown).await.unwrap();
    assert_eq!(bot.dispatcher().state(), PipelineState::Running);
    eventually(|| transport.receive_calls() >= 1).await;

    transport.inject(payload("hello", Some(CHAT_INTERNAL)));
    eventually(|| transport.sent_count() == 2).await;
    tokio::time::timeout(Duration::from_secs(5), bot.dispatcher().queue().wait_idle())
        .await
        .unwrap();
    assert_eq!(bot.dispatcher().queue().pending(), 0);

    let mut texts: Vec<String> = transport.sent().into_iter().map(|(_, m)| m.text).collect();
    texts.sort();
    assert_eq!(texts, ["first", "second"]);
    // Internal group id resolved to the public one.
    assert!(transport.sent().iter().all(|(to, _)| to == CHAT_ID));

    bot.dispatcher().stop().await;
}

#[tokio::test]
async fn test_unmatched_and_unknown_payloads_are_skipped() {
    let transport = MockTransport::with_groups(vec![]);
    let bot = bot_with(&transport);
    bot.register(
        Reply("pong"),
        ContactFilter::All,
        GroupFilter::None,
        Some(triggered(&["ping"])),
    )
    .await;

    let shutdown = CancellationToken::new();
    bot.start(&shutdown).await.unwrap();
    eventually(|| transport.receive_calls() >= 1).await;

    transport.inject("not json at all".into());
    transport.inject(json!({ "envelope": { "source": SENDER } }).to_string());
    transport.inject(payload("hello", None));
    transport.inject(payload("ping", None));

    eventually(|| transport.sent_count() == 1).await;
    assert_eq!(transport.sent()[0], (SENDER.to_string(), OutgoingMessage::text("pong")));
    // The producer survived the garbage and did not reconnect.
    assert_eq!(transport.receive_calls(), 1);

    bot.dispatcher().stop().await;
}

#[tokio::test]
async fn test_failing_handlers_do_not_block_others() {
    let transport = MockTransport::with_groups(vec![]);
    let bot = bot_with(&transport);
    bot.register(Failing, ContactFilter::All, GroupFilter::All, None)
        .await;
    bot.register(Panicking, ContactFilter::All, GroupFilter::All, None)
        .await;
    bot.register(Reply("still here"), ContactFilter::All, GroupFilter::All, None)
        .await;

    let shutdown = CancellationToken::new();
    bot.start(&shutdown).await.unwrap();
    eventually(|| transport.receive_calls() >= 1).await;

    for expected in 1..=2 {
        transport.inject(payload("hi", None));
        eventually(|| transport.sent_count() == expected).await;
    }
    tokio::time::timeout(Duration::from_secs(5), bot.dispatcher().queue().wait_idle())
        .await
        .unwrap();
    assert_eq!(bot.dispatcher().task_count().await, 4);

    bot.dispatcher().stop().await;
}

#[tokio::test]
async fn test_unknown_group_refreshes_directory() {
    let transport = MockTransport::with_groups(vec![]);
    let bot = bot_with(&transport);
    bot.register(Reply("welcome"), ContactFilter::None, GroupFilter::All, None)
        .await;

    let shutdown = CancellationToken::new();
    bot.start(&shutdown).await.unwrap();
    assert_eq!(transport.list_calls(), 1);
    eventually(|| transport.receive_calls() >= 1).await;

    // The bot was added to a group after startup.
    transport.groups.lock().unwrap().push(chat_testing());
    transport.inject(payload("hi", Some(CHAT_INTERNAL)));

    eventually(|| transport.sent_count() == 1).await;
    assert_eq!(transport.list_calls(), 2);
    assert_eq!(transport.sent()[0].0, CHAT_ID);
    assert!(bot.directory().by_internal_id(CHAT_INTERNAL).is_some());

    // Known now: no further refresh.
    transport.inject(payload("again", Some(CHAT_INTERNAL)));
    eventually(|| transport.sent_count() == 2).await;
    assert_eq!(transport.list_calls(), 2);

    bot.dispatcher().stop().await;
}

#[tokio::test]
async fn test_receive_error_restarts_producer() {
    let transport = MockTransport::with_groups(vec![]);
    let bot = bot_with(&transport);
    bot.register(Reply("back"), ContactFilter::All, GroupFilter::All, None)
        .await;

    let shutdown = CancellationToken::new();
    bot.start(&shutdown).await.unwrap();
    eventually(|| transport.receive_calls() >= 1).await;

    transport.fail_stream("connection reset");
    // Reconnects after the initial backoff.
    eventually(|| transport.receive_calls() >= 2).await;
    assert_eq!(bot.dispatcher().state(), PipelineState::Running);

    transport.inject(payload("hi", None));
    eventually(|| transport.sent_count() == 1).await;
    assert_eq!(transport.sent()[0].1.text, "back");
    assert_eq!(bot.dispatcher().task_count().await, 4);

    bot.dispatcher().stop().await;
}

#[tokio::test]
async fn test_closed_stream_restarts_producer() {
    let transport = MockTransport::with_groups(vec![]);
    let bot = bot_with(&transport);
    bot.register(Reply("back"), ContactFilter::All, GroupFilter::All, None)
        .await;

    let shutdown = CancellationToken::new();
    bot.start(&shutdown).await.unwrap();
    eventually(|| transport.receive_calls() >= 1).await;

    transport.close_streams();
    eventually(|| transport.receive_calls() >= 2).await;

    transport.inject(payload("hi", None));
    eventually(|| transport.sent_count() == 1).await;

    bot.dispatcher().stop().await;
}

#[tokio::test]
async fn test_restart_does_not_duplicate_tasks() {
    let transport = MockTransport::with_groups(vec![]);
    let bot = bot_with(&transport);
    bot.register(Reply("once"), ContactFilter::All, GroupFilter::All, None)
        .await;

    let shutdown = CancellationToken::new();
    bot.start(&shutdown).await.unwrap();
    assert_eq!(bot.dispatcher().task_count().await, 4);
    eventually(|| transport.receive_calls() >= 1).await;

    bot.start(&shutdown).await.unwrap();
    assert_eq!(bot.dispatcher().task_count().await, 4);
    assert_eq!(bot.dispatcher().state(), PipelineState::Running);
    eventually(|| transport.receive_calls() >= 2).await;

    transport.inject(payload("hi", None));
    eventually(|| transport.sent_count() == 1).await;
    tokio::time::timeout(Duration::from_secs(5), bot.dispatcher().queue().wait_idle())
        .await
        .unwrap();
    assert_eq!(transport.sent_count(), 1);

    bot.dispatcher().stop().await;
    assert_eq!(bot.dispatcher().task_count().await, 0);
    assert_eq!(bot.dispatcher().state(), PipelineState::Stopped);
}

#[tokio::test]
async fn test_run_until_stops_on_cancel() {
    let transport = MockTransport::with_groups(vec![chat_testing()]);
    let bot = bot_with(&transport);

    let shutdown = CancellationToken::new();
    let stopper = shutdown.clone();
    let watcher = Arc::clone(&transport);
    let stop = async move {
        eventually(|| watcher.receive_calls() >= 1).await;
        stopper.cancel();
    };

    let (result, ()) = tokio::join!(bot.run_until(shutdown), stop);
    assert!(result.is_ok());
    assert_eq!(bot.dispatcher().state(), PipelineState::Stopped);
    assert_eq!(bot.dispatcher().task_count().await, 0);
}

// --- Context and handle ---

#[tokio::test]
async fn test_context_reply_quotes_message() {
    let transport = MockTransport::with_groups(vec![chat_testing()]);
    let bot = bot_with(&transport);
    bot.directory().refresh().await.unwrap();

    let ctx = Context::new(group_message("hello", CHAT_INTERNAL), bot.handle().clone());
    let timestamp = ctx.reply("hi back").await.unwrap();
    assert_eq!(timestamp, 1_700_000_000_001);

    let (to, sent) = &transport.sent()[0];
    assert_eq!(to, CHAT_ID);
    assert_eq!(sent.text, "hi back");
    let quote = sent.quote.as_ref().unwrap();
    assert_eq!(quote.author, SENDER_UUID);
    assert_eq!(quote.text, "hello");
    assert_eq!(quote.timestamp, 1632576001632);

    ctx.edit("edited", timestamp).await.unwrap();
    assert_eq!(transport.sent()[1].1.edit_timestamp, Some(timestamp));
}

#[tokio::test]
async fn test_context_react_targets_sender() {
    let transport = MockTransport::with_groups(vec![]);
    let bot = bot_with(&transport);
    let ctx = Context::new(private_message("nice"), bot.handle().clone());

    ctx.react("👍").await.unwrap();
    assert_eq!(
        transport.reactions.lock().unwrap()[0],
        (SENDER.to_string(), "👍".to_string(), SENDER.to_string(), 1632576001632)
    );
}

#[tokio::test]
async fn test_receipts_skip_groups() {
    let transport = MockTransport::with_groups(vec![chat_testing()]);
    let bot = bot_with(&transport);
    bot.directory().refresh().await.unwrap();

    let in_group = Context::new(group_message("hi", CHAT_INTERNAL), bot.handle().clone());
    in_group.receipt(ReceiptType::Read).await.unwrap();
    assert!(transport.receipts.lock().unwrap().is_empty());

    let private = Context::new(private_message("hi"), bot.handle().clone());
    private.receipt(ReceiptType::Viewed).await.unwrap();
    assert_eq!(
        transport.receipts.lock().unwrap()[0],
        (SENDER.to_string(), ReceiptType::Viewed, 1632576001632)
    );
}

#[tokio::test]
async fn test_send_to_unknown_receiver_fails() {
    let transport = MockTransport::with_groups(vec![]);
    let bot = bot_with(&transport);
    let err = bot
        .handle()
        .send("somebody", &OutgoingMessage::text("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, SignalError::UnresolvableReceiver(_)));
    assert_eq!(transport.sent_count(), 0);
}

#[tokio::test]
async fn test_storage_shared_through_context() {
    let transport = MockTransport::with_groups(vec![]);
    let bot = bot_with(&transport);
    let ctx = Context::new(private_message("hi"), bot.handle().clone());

    ctx.storage().save("counter", &json!(3)).await.unwrap();
    assert_eq!(bot.handle().storage().read("counter").await.unwrap(), json!(3));
}
