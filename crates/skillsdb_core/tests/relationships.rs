use rusqlite::Connection;
use skillsdb_core::{
    dispatch, open_db_in_memory, CommandError, CommandFlags, CommandOutcome, CommandRequest,
    EntityType, Record, RecordStore, SqliteRecordStore,
};

fn run(
    conn: &mut Connection,
    flags: CommandFlags,
    tokens: &[&str],
) -> Result<CommandOutcome, CommandError> {
    dispatch(
        conn,
        &CommandRequest {
            flags,
            tokens: tokens.iter().map(|token| token.to_string()).collect(),
        },
    )
}

fn created_id(outcome: CommandOutcome) -> i64 {
    match outcome {
        CommandOutcome::Created { id, .. } => id,
        other => panic!("expected Created, got {other:?}"),
    }
}

fn create_parent(conn: &mut Connection, first_name: &str, second_name: &str) -> i64 {
    let flags = CommandFlags {
        parent: true,
        add: true,
        ..CommandFlags::default()
    };
    let first = format!("first_name={first_name}");
    let second = format!("second_name={second_name}");
    created_id(run(conn, flags, &[&first, &second]).unwrap())
}

fn pair(conn: &mut Connection, parent_id: i64, partner_id: i64) {
    let flags = CommandFlags {
        parent: true,
        modify: true,
        pid: Some(parent_id),
        ..CommandFlags::default()
    };
    let token = format!("partner={partner_id}");
    run(conn, flags, &[&token]).unwrap();
}

fn search(conn: &mut Connection, entity: EntityType, tokens: &[&str]) -> Vec<Record> {
    let mut flags = CommandFlags {
        search: true,
        ..CommandFlags::default()
    };
    match entity {
        EntityType::Parent => flags.parent = true,
        EntityType::Child => flags.child = true,
        EntityType::Skill => flags.skill = true,
        EntityType::Freetime => flags.freetime = true,
        EntityType::Address => flags.address = true,
    }
    match run(conn, flags, tokens).unwrap() {
        CommandOutcome::Matched { records } => records,
        other => panic!("expected Matched, got {other:?}"),
    }
}

#[test]
fn partner_link_is_directional_in_storage_but_symmetric_in_resolution() {
    let mut conn = open_db_in_memory().unwrap();
    let fred = create_parent(&mut conn, "Fred", "Flintstone");
    let wilma = create_parent(&mut conn, "Wilma", "Flintstone");
    pair(&mut conn, fred, wilma);

    let store = SqliteRecordStore::new(&conn);
    assert_eq!(store.partner_of(fred).unwrap(), Some(wilma));
    assert_eq!(store.other_of(wilma).unwrap(), Some(fred));
    // The reciprocal of each direction stays empty.
    assert_eq!(store.other_of(fred).unwrap(), None);
    assert_eq!(store.partner_of(wilma).unwrap(), None);
}

#[test]
fn partner_can_be_set_at_parent_creation() {
    let mut conn = open_db_in_memory().unwrap();
    let wilma = create_parent(&mut conn, "Wilma", "Flintstone");

    let flags = CommandFlags {
        parent: true,
        add: true,
        ..CommandFlags::default()
    };
    let token = format!("partner={wilma}");
    let fred = created_id(run(&mut conn, flags, &["first_name=Fred", &token]).unwrap());

    let store = SqliteRecordStore::new(&conn);
    assert_eq!(store.partner_of(fred).unwrap(), Some(wilma));
}

#[test]
fn partner_reassignment_requires_clearing_the_existing_link() {
    let mut conn = open_db_in_memory().unwrap();
    let fred = create_parent(&mut conn, "Fred", "Flintstone");
    let wilma = create_parent(&mut conn, "Wilma", "Flintstone");
    let barney = create_parent(&mut conn, "Barney", "Rubble");
    pair(&mut conn, fred, wilma);

    let flags = CommandFlags {
        parent: true,
        modify: true,
        pid: Some(fred),
        ..CommandFlags::default()
    };
    let token = format!("partner={barney}");
    let err = run(&mut conn, flags, &[&token]).unwrap_err();
    assert!(matches!(err, CommandError::Link(_)));

    // Both directions of an existing pair are protected.
    let flags = CommandFlags {
        parent: true,
        modify: true,
        pid: Some(barney),
        ..CommandFlags::default()
    };
    let token = format!("partner={wilma}");
    let err = run(&mut conn, flags, &[&token]).unwrap_err();
    assert!(matches!(err, CommandError::Link(_)));
}

#[test]
fn restating_the_same_pairing_is_a_no_op() {
    let mut conn = open_db_in_memory().unwrap();
    let fred = create_parent(&mut conn, "Fred", "Flintstone");
    let wilma = create_parent(&mut conn, "Wilma", "Flintstone");
    pair(&mut conn, fred, wilma);
    pair(&mut conn, fred, wilma);

    let store = SqliteRecordStore::new(&conn);
    assert_eq!(store.partner_of(fred).unwrap(), Some(wilma));
}

#[test]
fn self_partnering_and_unknown_partners_are_link_errors() {
    let mut conn = open_db_in_memory().unwrap();
    let fred = create_parent(&mut conn, "Fred", "Flintstone");

    let flags = CommandFlags {
        parent: true,
        modify: true,
        pid: Some(fred),
        ..CommandFlags::default()
    };
    let own = format!("partner={fred}");
    assert!(matches!(
        run(&mut conn, flags, &[&own]).unwrap_err(),
        CommandError::Link(_)
    ));
    assert!(matches!(
        run(&mut conn, flags, &["partner=999"]).unwrap_err(),
        CommandError::Link(_)
    ));
}

#[test]
fn failed_partner_link_rolls_back_the_created_parent() {
    let mut conn = open_db_in_memory().unwrap();

    let flags = CommandFlags {
        parent: true,
        add: true,
        ..CommandFlags::default()
    };
    let err = run(&mut conn, flags, &["first_name=Lonely", "partner=999"]).unwrap_err();
    assert!(matches!(err, CommandError::Link(_)));

    let records = search(&mut conn, EntityType::Parent, &["first_name=Lonely,equals"]);
    assert!(records.is_empty());
}

#[test]
fn child_of_a_partnered_parent_links_both_parents() {
    let mut conn = open_db_in_memory().unwrap();
    let fred = create_parent(&mut conn, "Fred", "Flintstone");
    let wilma = create_parent(&mut conn, "Wilma", "Flintstone");
    pair(&mut conn, fred, wilma);

    let flags = CommandFlags {
        child: true,
        add: true,
        // The partner direction must not matter for linking.
        pid: Some(wilma),
        ..CommandFlags::default()
    };
    let pebbles = created_id(run(&mut conn, flags, &["first_name=Pebbles"]).unwrap());

    let store = SqliteRecordStore::new(&conn);
    let mut parents = store
        .linked_parent_ids(EntityType::Child, pebbles)
        .unwrap();
    parents.sort_unstable();
    assert_eq!(parents, vec![fred, wilma]);
}

#[test]
fn child_of_an_unpartnered_parent_links_one_parent() {
    let mut conn = open_db_in_memory().unwrap();
    let fred = create_parent(&mut conn, "Fred", "Flintstone");

    let flags = CommandFlags {
        child: true,
        add: true,
        pid: Some(fred),
        ..CommandFlags::default()
    };
    let child = created_id(run(&mut conn, flags, &["first_name=Pebbles"]).unwrap());

    let store = SqliteRecordStore::new(&conn);
    assert_eq!(
        store.linked_parent_ids(EntityType::Child, child).unwrap(),
        vec![fred]
    );
}

#[test]
fn creating_a_dependent_for_an_unknown_parent_is_a_link_error() {
    let mut conn = open_db_in_memory().unwrap();

    let flags = CommandFlags {
        skill: true,
        add: true,
        pid: Some(999),
        ..CommandFlags::default()
    };
    let err = run(&mut conn, flags, &["name=cooking"]).unwrap_err();
    assert!(matches!(err, CommandError::Link(_)));

    // Nothing was persisted.
    let records = search(&mut conn, EntityType::Skill, &["name=cooking,equals"]);
    assert!(records.is_empty());
}

#[test]
fn deleting_a_parent_orphans_its_skills_instead_of_cascading() {
    let mut conn = open_db_in_memory().unwrap();
    let fred = create_parent(&mut conn, "Fred", "Flintstone");

    let skill_flags = CommandFlags {
        skill: true,
        add: true,
        pid: Some(fred),
        ..CommandFlags::default()
    };
    let skill = created_id(run(&mut conn, skill_flags, &["name=cooking"]).unwrap());

    let delete_flags = CommandFlags {
        parent: true,
        delete: true,
        pid: Some(fred),
        ..CommandFlags::default()
    };
    run(&mut conn, delete_flags, &[]).unwrap();

    // The skill row survives; only the join edge is gone.
    let records = search(&mut conn, EntityType::Skill, &["name=cooking,equals"]);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id(), skill);

    let store = SqliteRecordStore::new(&conn);
    assert!(store
        .linked_parent_ids(EntityType::Skill, skill)
        .unwrap()
        .is_empty());
}

#[test]
fn deleting_a_parent_leaves_its_address_with_a_stale_reference() {
    let mut conn = open_db_in_memory().unwrap();
    let fred = create_parent(&mut conn, "Fred", "Flintstone");

    let address_flags = CommandFlags {
        address: true,
        add: true,
        pid: Some(fred),
        ..CommandFlags::default()
    };
    run(&mut conn, address_flags, &["line01=1 Rock House"]).unwrap();

    let delete_flags = CommandFlags {
        parent: true,
        delete: true,
        pid: Some(fred),
        ..CommandFlags::default()
    };
    run(&mut conn, delete_flags, &[]).unwrap();

    let records = search(
        &mut conn,
        EntityType::Address,
        &["line01=1 Rock House,equals"],
    );
    assert_eq!(records.len(), 1);
    match &records[0] {
        Record::Address(address) => assert_eq!(address.parent_id, Some(fred)),
        other => panic!("expected address record, got {other:?}"),
    }
}

#[test]
fn deleting_a_partnered_parent_clears_the_partner_edge() {
    let mut conn = open_db_in_memory().unwrap();
    let fred = create_parent(&mut conn, "Fred", "Flintstone");
    let wilma = create_parent(&mut conn, "Wilma", "Flintstone");
    pair(&mut conn, fred, wilma);

    let delete_flags = CommandFlags {
        parent: true,
        delete: true,
        pid: Some(fred),
        ..CommandFlags::default()
    };
    run(&mut conn, delete_flags, &[]).unwrap();

    let store = SqliteRecordStore::new(&conn);
    assert_eq!(store.other_of(wilma).unwrap(), None);
    assert_eq!(store.partner_of(wilma).unwrap(), None);
}
