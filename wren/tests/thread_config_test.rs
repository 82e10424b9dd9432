// Integration tests for config types in wren::thread::config

use std::thread;

use wren::thread::config::*;
use wren::{Ask, AskEnvelope, ThreadActor};

use test_helpers::EVENTUALLY;

#[test]
fn test_actor_config_defaults() {
    let config = ThreadActorConfig::default();

    assert!(config.mailbox_capacity.is_none());
    assert_eq!(config.thread_name_prefix, DEFAULT_THREAD_NAME_PREFIX);
}

#[test]
fn test_actor_config_builders() {
    let config = ThreadActorConfig::bounded(4).with_thread_name_prefix("ledger");
    assert_eq!(config.mailbox_capacity, Some(4));
    assert_eq!(config.thread_name_prefix, "ledger");

    assert_eq!(config.clone().with_mailbox_capacity(0).mailbox_capacity, Some(0));
    assert_eq!(config.unbounded().mailbox_capacity, None);
}

#[test]
fn test_pmap_options_defaults() {
    let options = PMapOptions::default();
    assert_eq!(options.fixed_pool, 0);
    assert!(!options.random_order);

    assert_eq!(PMapOptions::cpu_bound().fixed_pool, num_cpus::get());
    assert!(PMapOptions::default().with_random_order(true).random_order);
}

#[test]
fn test_worker_thread_uses_name_prefix() {
    let actor = ThreadActor::with_config(ThreadActorConfig::default().with_thread_name_prefix("ledger"), |_ctx, msg| {
        if let Ok(ask) = msg.downcast::<AskEnvelope<(), Option<String>>>() {
            ask.reply(thread::current().name().map(str::to_owned));
        }
    })
    .unwrap();

    let name = Ask::<(), Option<String>>::new(()).timeout(EVENTUALLY).once(&actor).flatten();
    assert_eq!(name, Some(format!("ledger-{}", actor.id())));
}

#[test]
fn test_children_inherit_parent_config() {
    let parent = ThreadActor::with_config(ThreadActorConfig::bounded(2), |ctx, msg| {
        if let Ok(ask) = msg.downcast::<AskEnvelope<(), (Option<usize>, Option<usize>)>>() {
            let inherited = ctx.spawn(|_child, _msg| {}).unwrap();
            let explicit = ctx
                .spawn_with_config(ThreadActorConfig::default(), |_child, _msg| {})
                .unwrap();
            ask.reply((inherited.mailbox_capacity(), explicit.mailbox_capacity()));
        }
    })
    .unwrap();

    let capacities = Ask::<(), (Option<usize>, Option<usize>)>::new(())
        .timeout(EVENTUALLY)
        .once(&parent);
    assert_eq!(capacities, Some((Some(2), None)));
}

#[test]
fn test_config_debug_format() {
    let actor_config = ThreadActorConfig::default();
    let options = PMapOptions::cpu_bound();
    assert!(format!("{:?}", actor_config).contains("mailbox_capacity"));
    assert!(format!("{:?}", options).contains("fixed_pool"));
}
