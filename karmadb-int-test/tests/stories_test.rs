use karmadb::common::Value;
use karmadb::errors::{ErrorKind, StoreResult};
use karmadb_int_test::test_util::{cleanup, create_test_context, register_user, submit_story};

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_submit_and_read_with_author() -> StoreResult<()> {
    let ctx = create_test_context()?;
    let stories = ctx.stories();

    let alice = register_user(&ctx, "alice")?;
    let story = stories
        .create(&alice, "title", Some("content text"), Some("http://example.com"))?
        .inserted_id();

    let read = stories.find_one(&story.to_hex())?.expect("story exists");
    assert_eq!(read.get("title"), Value::from("title"));
    assert_eq!(read.get("text"), Value::from("content text"));
    assert_eq!(read.get("url"), Value::from("http://example.com"));
    assert_eq!(read.get("karma"), Value::I64(1));
    assert!(read.get("created_on").is_date_time());

    // author summary joined in the same round trip, credential-free
    assert_eq!(read.get("author.username"), Value::from("alice"));
    assert_eq!(read.get("author.karma"), Value::I64(1));
    assert_eq!(read.get("author.password"), Value::Null);

    cleanup(ctx)
}

#[test]
fn test_missing_story_is_reported_as_absent() -> StoreResult<()> {
    let ctx = create_test_context()?;
    assert!(ctx.stories().find_one("507f1f77bcf86cd799439011")?.is_none());
    cleanup(ctx)
}

#[test]
fn test_malformed_id_fails_before_any_io() -> StoreResult<()> {
    let ctx = create_test_context()?;
    let stories = ctx.stories();

    let err = stories.find_one("wrong ObjectID").unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::Validation);
    assert_eq!(
        err.message(),
        "Argument passed in must be a single String of 12 bytes or a string of 24 hex characters"
    );

    cleanup(ctx)
}

#[test]
fn test_front_page_listing() -> StoreResult<()> {
    let ctx = create_test_context()?;
    let stories = ctx.stories();
    let alice = register_user(&ctx, "alice")?;

    for title in ["oldest", "middle", "newest"] {
        submit_story(&ctx, &alice, title)?;
        std::thread::sleep(std::time::Duration::from_millis(2));
    }

    let page = stories.find_all(0, 10)?;
    assert_eq!(page.len(), 3);
    assert_eq!(page[0].get("title"), Value::from("newest"));
    assert_eq!(page[2].get("title"), Value::from("oldest"));
    assert!(page.iter().all(|s| s.get("author.username") == Value::from("alice")));

    let second_page = stories.find_all(2, 10)?;
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].get("title"), Value::from("oldest"));

    cleanup(ctx)
}

#[test]
fn test_story_votes() -> StoreResult<()> {
    let ctx = create_test_context()?;
    let stories = ctx.stories();
    let alice = register_user(&ctx, "alice")?;
    let story = submit_story(&ctx, &alice, "title")?;

    stories.increment_vote(&story, 1)?;
    stories.increment_vote(&story, 1)?;
    stories.increment_vote(&story, -1)?;

    let read = stories.find_one(&story)?.unwrap();
    assert_eq!(read.get("karma"), Value::I64(2));

    cleanup(ctx)
}
