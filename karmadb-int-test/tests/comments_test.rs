use karmadb::common::Value;
use karmadb::errors::StoreResult;
use karmadb_int_test::test_util::{cleanup, create_test_context, register_user, submit_story};

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_threaded_conversation() -> StoreResult<()> {
    let ctx = create_test_context()?;
    let comments = ctx.comments();

    let alice = register_user(&ctx, "alice")?;
    let bob = register_user(&ctx, "bob")?;
    let story = submit_story(&ctx, &alice, "title")?;

    let top = comments
        .create(&story, &bob, "interesting", None)?
        .inserted_id();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let reply = comments
        .create(&story, &alice, "thanks", Some(&top.to_hex()))?
        .inserted_id();

    let thread = comments.find_all_by_story(&story)?;
    assert_eq!(thread.len(), 2);

    assert_eq!(thread[0].get("text"), Value::from("interesting"));
    assert_eq!(thread[0].get("author.username"), Value::from("bob"));
    assert!(!thread[0].contains_key("parent_id"));

    assert_eq!(thread[1].get("text"), Value::from("thanks"));
    assert_eq!(thread[1].get("author.username"), Value::from("alice"));
    assert_eq!(thread[1].get("parent_id"), Value::ObjectId(top));

    let read = comments.find_one(&reply.to_hex())?.unwrap();
    assert_eq!(read.get("author.username"), Value::from("alice"));
    assert_eq!(read.get("author.password"), Value::Null);

    cleanup(ctx)
}

#[test]
fn test_comment_votes() -> StoreResult<()> {
    let ctx = create_test_context()?;
    let comments = ctx.comments();

    let alice = register_user(&ctx, "alice")?;
    let story = submit_story(&ctx, &alice, "title")?;
    let comment = comments
        .create(&story, &alice, "hot take", None)?
        .inserted_id()
        .to_hex();

    comments.increment_vote(&comment, -4)?;
    let read = comments.find_one(&comment)?.unwrap();
    assert_eq!(read.get("karma"), Value::I64(-3));

    cleanup(ctx)
}

#[test]
fn test_comments_of_missing_story_are_empty() -> StoreResult<()> {
    let ctx = create_test_context()?;
    let thread = ctx
        .comments()
        .find_all_by_story("507f1f77bcf86cd799439011")?;
    assert!(thread.is_empty());
    cleanup(ctx)
}
