use std::{cell::RefCell, cmp::Ordering, rc::Rc};

use proptest::prelude::*;
use toc::{account::*, util::locale_cmp, Error};

fn account(id: impl ToString, name: impl ToString) -> SharedAccountDef {
    let account_type = AccountType::ImapSmtp;

    let def = make_account_def(AccountDefParts {
        infra: Infra {
            id: id.to_string(),
            name: name.to_string(),
            account_type,
        },
        credentials: Credentials {
            username: "user@localhost".into(),
            password: Some(Password::new("imap-secret")),
            outgoing_username: Some("smtp-user@localhost".into()),
            outgoing_password: Some(Password::new("smtp-secret")),
            oauth2: None,
        },
        prefs: AccountPrefs::default(),
        type_fields: account_type.type_fields(),
        engine_fields: EngineFields {
            engine: "vanillaImap".into(),
            engine_data: serde_json::Value::Null,
        },
        conn_info_fields: ConnInfoFields::Composite {
            receive_conn_info: ConnInfo::new("imap.localhost", 993, Crypto::Ssl),
            send_conn_info: ConnInfo::new("smtp.localhost", 587, Crypto::StartTls),
        },
        identities: vec![Identity::new("0", "User", "user@localhost")],
    });

    Rc::new(RefCell::new(def))
}

fn record(toc: &AccountsToc) -> Rc<RefCell<Vec<AccountsTocEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let events_for_closure = events.clone();

    toc.subscribe(move |evt| {
        events_for_closure.borrow_mut().push(evt);
        Ok(())
    });

    events
}

fn names(toc: &AccountsToc) -> Vec<String> {
    toc.get_all_items()
        .into_iter()
        .map(|wire_rep| wire_rep.name)
        .collect()
}

#[test_log::test]
fn add_accounts_sorted_by_name() {
    let mut writer = AccountsTocWriter::new();
    let toc = writer.toc();
    let events = record(&toc);

    writer.add_account(account("0", "Work"));
    writer.add_account(account("1", "home"));
    writer.add_account(account("2", "Newsletters"));

    assert_eq!(names(&toc), vec!["home", "Newsletters", "Work"]);
    assert!(toc.is_known_account("0"));
    assert!(toc.is_known_account("1"));
    assert!(toc.is_known_account("2"));
    assert!(!toc.is_known_account("3"));
    assert_eq!(toc.len(), 3);

    let indexes: Vec<_> = events
        .borrow()
        .iter()
        .map(|evt| match evt {
            AccountsTocEvent::Add(wire_rep, index) => (wire_rep.id.clone(), *index),
            evt => panic!("unexpected event: {evt:?}"),
        })
        .collect();

    assert_eq!(
        indexes,
        vec![("0".into(), 0), ("1".into(), 0), ("2".into(), 1)]
    );
}

#[test_log::test]
fn accented_names_sort_with_their_base_letter() {
    let mut writer = AccountsTocWriter::new();
    let toc = writer.toc();

    for (id, name) in ["Zoe", "Émile", "Adam", "Ørsted", "Oscar", "emma"]
        .into_iter()
        .enumerate()
    {
        writer.add_account(account(id, name));
    }

    assert_eq!(
        names(&toc),
        vec!["Adam", "Émile", "emma", "Ørsted", "Oscar", "Zoe"]
    );
}

#[test_log::test]
fn equal_names_keep_insertion_order() {
    let mut writer = AccountsTocWriter::new();
    let toc = writer.toc();

    writer.add_account(account("b1", "b"));
    writer.add_account(account("a", "a"));
    writer.add_account(account("b2", "b"));

    let ids: Vec<_> = toc.get_all_items().into_iter().map(|w| w.id).collect();
    assert_eq!(ids, vec!["a", "b1", "b2"]);
}

#[test_log::test]
fn remove_account() {
    let mut writer = AccountsTocWriter::new();
    let toc = writer.toc();

    writer.add_account(account("0", "a"));
    writer.add_account(account("1", "b"));
    writer.add_account(account("2", "c"));

    let events = record(&toc);
    writer.remove_account_by_id("1").unwrap();

    assert!(!toc.is_known_account("1"));
    assert_eq!(names(&toc), vec!["a", "c"]);
    assert_eq!(
        *events.borrow(),
        vec![AccountsTocEvent::Remove("1".into(), 1)]
    );
}

#[test_log::test]
fn remove_unknown_account_fails() {
    let mut writer = AccountsTocWriter::new();
    let toc = writer.toc();
    writer.add_account(account("0", "a"));
    let events = record(&toc);

    assert_eq!(
        writer.remove_account_by_id("1"),
        Err(Error::UnknownAccountError("1".into()))
    );

    // nothing changed
    assert_eq!(names(&toc), vec!["a"]);
    assert!(events.borrow().is_empty());
}

#[test_log::test]
fn modify_account_in_place() {
    let mut writer = AccountsTocWriter::new();
    let toc = writer.toc();

    let a = account("0", "a");
    let b = account("1", "b");
    writer.add_account(a.clone());
    writer.add_account(b.clone());

    let events = record(&toc);

    b.borrow_mut().prefs.notify_on_new = false;
    writer.account_modified(&b).unwrap();

    let items = toc.get_all_items();
    assert!(!items[1].notify_on_new);
    assert_eq!(
        *events.borrow(),
        vec![AccountsTocEvent::Change(items[1].clone(), 1)]
    );
}

#[test_log::test]
fn modify_account_does_not_reorder() {
    let mut writer = AccountsTocWriter::new();
    let toc = writer.toc();

    let a = account("0", "a");
    writer.add_account(a.clone());
    writer.add_account(account("1", "b"));

    a.borrow_mut().name = "z".into();
    writer.account_modified(&a).unwrap();

    assert_eq!(names(&toc), vec!["z", "b"]);
}

#[test_log::test]
fn modify_untracked_account_fails() {
    let mut writer = AccountsTocWriter::new();
    let toc = writer.toc();
    writer.add_account(account("0", "a"));
    let events = record(&toc);

    // same id, different object
    let copy = account("0", "a");

    assert_eq!(
        writer.account_modified(&copy),
        Err(Error::UntrackedAccountError("0".into()))
    );
    assert!(events.borrow().is_empty());
}

#[test_log::test]
fn wire_rep_never_exposes_passwords() {
    let mut writer = AccountsTocWriter::new();
    let toc = writer.toc();

    let def = account("0", "a");
    def.borrow_mut().credentials.oauth2 = Some(OAuth2Credentials {
        client_id: "client".into(),
        access_token: "access".into(),
        refresh_token: "refresh".into(),
        ..Default::default()
    });
    let wire_rep = writer.add_account(def);

    assert_eq!(toc.get_all_items(), vec![wire_rep.clone()]);

    let debug = format!("{wire_rep:?}");
    assert!(!debug.contains("imap-secret"));
    assert!(!debug.contains("smtp-secret"));

    assert_eq!(wire_rep.credentials.username, "user@localhost");
    assert_eq!(
        wire_rep.credentials.outgoing_username.as_deref(),
        Some("smtp-user@localhost")
    );
    let oauth2 = wire_rep.credentials.oauth2.unwrap();
    assert_eq!(oauth2.access_token, "access");
    assert_eq!(oauth2.refresh_token, "refresh");
}

#[test_log::test]
fn wire_rep_servers() {
    let wire_rep = account("0", "a").borrow().to_wire_rep();
    let [receive, send] = wire_rep.servers;

    assert_eq!(receive.server_type, Some(ServerType::Imap));
    assert_eq!(receive.conn_info.map(|info| info.port), Some(993));
    assert_eq!(receive.active_conns, 0);

    assert_eq!(send.server_type, Some(ServerType::Smtp));
    assert_eq!(send.conn_info.map(|info| info.crypto), Some(Crypto::StartTls));
    assert_eq!(send.active_conns, 0);

    assert!(wire_rep.enabled);
    assert!(wire_rep.problems.is_empty());
}

#[test_log::test]
fn mirrored_list_follows_events() {
    let mut writer = AccountsTocWriter::new();
    let toc = writer.toc();
    writer.add_account(account("0", "m"));

    let mirror = Rc::new(RefCell::new(toc.get_all_items()));
    let mirror_for_closure = mirror.clone();
    toc.subscribe(move |evt| {
        evt.apply_to(&mut mirror_for_closure.borrow_mut())?;
        Ok(())
    });

    let c = account("1", "c");
    writer.add_account(c.clone());
    writer.add_account(account("2", "x"));
    writer.add_account(account("3", "a"));
    c.borrow_mut().prefs.sync_interval = 0;
    writer.account_modified(&c).unwrap();
    writer.remove_account_by_id("0").unwrap();

    assert_eq!(*mirror.borrow(), toc.get_all_items());
}

#[test_log::test]
fn mirror_out_of_sync_fails() {
    let mut writer = AccountsTocWriter::new();
    let toc = writer.toc();
    let events = record(&toc);

    writer.add_account(account("0", "a"));
    writer.add_account(account("1", "b"));
    writer.remove_account_by_id("1").unwrap();

    let events = events.borrow();
    let mut mirror = Vec::new();

    assert_eq!(
        events[1].apply_to(&mut mirror),
        Err(Error::MirroredListOutOfSyncError(1, 0))
    );
    assert_eq!(
        events[2].apply_to(&mut mirror),
        Err(Error::MirroredListOutOfSyncError(1, 0))
    );
    assert!(mirror.is_empty());

    events[0].apply_to(&mut mirror).unwrap();
    assert_eq!(mirror, toc.get_all_items());
}

#[test_log::test]
fn listeners_can_read_the_toc() {
    let mut writer = AccountsTocWriter::new();
    let toc = writer.toc();

    let lens = Rc::new(RefCell::new(Vec::new()));
    let lens_for_closure = lens.clone();
    let reader = toc.acquire();
    toc.subscribe(move |_| {
        lens_for_closure.borrow_mut().push(reader.len());
        Ok(())
    });

    writer.add_account(account("0", "a"));
    writer.add_account(account("1", "b"));
    writer.remove_account_by_id("0").unwrap();

    // each event is delivered after the mutation it describes
    assert_eq!(*lens.borrow(), vec![1, 2, 1]);
    toc.release();
}

#[test_log::test]
fn unsubscribed_listener_stops_receiving() {
    let mut writer = AccountsTocWriter::new();
    let toc = writer.toc();

    let count = Rc::new(RefCell::new(0));
    let count_for_closure = count.clone();
    let id = toc.subscribe(move |_| {
        *count_for_closure.borrow_mut() += 1;
        Ok(())
    });

    writer.add_account(account("0", "a"));
    assert!(toc.unsubscribe(id));
    writer.add_account(account("1", "b"));

    assert_eq!(*count.borrow(), 1);
}

#[test_log::test]
fn default_account() {
    let mut writer = AccountsTocWriter::new();
    let toc = writer.toc();
    assert_eq!(toc.default_account(), None);

    let a = account("0", "a");
    let b = account("1", "b");
    writer.add_account(a.clone());
    writer.add_account(b.clone());

    b.borrow_mut().make_default();
    writer.account_modified(&b).unwrap();
    assert_eq!(toc.default_account().map(|w| w.id), Some("1".into()));

    a.borrow_mut().make_default();
    writer.account_modified(&a).unwrap();
    assert_eq!(toc.default_account().map(|w| w.id), Some("0".into()));
}

#[test_log::test]
fn custom_comparator() {
    let mut writer = AccountsTocWriter::with_comparator(|a, b| b.name.cmp(&a.name));
    let toc = writer.toc();

    writer.add_account(account("0", "a"));
    writer.add_account(account("1", "c"));
    writer.add_account(account("2", "b"));

    assert_eq!(names(&toc), vec!["c", "b", "a"]);
}

proptest! {
    #[test]
    fn items_always_sorted(names in prop::collection::vec("[a-zA-Z éÉèøØłŁßæ]{1,8}", 0..24)) {
        let mut writer = AccountsTocWriter::new();
        let toc = writer.toc();

        for (id, name) in names.iter().enumerate() {
            writer.add_account(account(id, name));

            let items = toc.get_all_items();
            prop_assert!(items
                .windows(2)
                .all(|pair| locale_cmp(&pair[0].name, &pair[1].name) != Ordering::Greater));
        }

        for id in 0..names.len() {
            prop_assert!(toc.is_known_account(&id.to_string()));
        }
        prop_assert_eq!(toc.len(), names.len());
    }

    #[test]
    fn equal_names_are_stable(names in prop::collection::vec("[abc]", 0..24)) {
        let mut writer = AccountsTocWriter::new();
        let toc = writer.toc();

        for (id, name) in names.iter().enumerate() {
            writer.add_account(account(format!("{id:03}"), name));
        }

        // ids are zero-padded, so among equal names they must read in
        // ascending order
        let items = toc.get_all_items();
        for pair in items.windows(2) {
            if pair[0].name == pair[1].name {
                prop_assert!(pair[0].id < pair[1].id);
            }
        }
    }

    #[test]
    fn remove_drops_exactly_one(count in 1usize..16, victim in 0usize..16) {
        let victim = victim % count;
        let mut writer = AccountsTocWriter::new();
        let toc = writer.toc();

        for id in 0..count {
            writer.add_account(account(id, format!("account {}", count - id)));
        }

        writer.remove_account_by_id(&victim.to_string()).unwrap();

        prop_assert!(!toc.is_known_account(&victim.to_string()));
        prop_assert_eq!(toc.len(), count - 1);
        prop_assert!(writer.remove_account_by_id(&victim.to_string()).is_err());
    }
}
