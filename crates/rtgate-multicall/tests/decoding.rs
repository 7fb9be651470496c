//! End-to-end decoding behaviour across builders, schemas and raw responses.

use rtgate_multicall::{
    EntityCall, MulticallError, Peer, Record, RpcValue, SystemCall, SystemFacts, SystemMulticall,
    Torrent, Tracker, decode_entities, decode_system_facts,
};

fn array(values: Vec<RpcValue>) -> RpcValue {
    RpcValue::Array(values)
}

#[test]
fn view_scenario_decodes_two_records_in_order() -> Result<(), MulticallError> {
    let call = EntityCall::<Torrent>::view("main")
        .select("d.hash=")?
        .select("d.name=")?;
    assert_eq!(call.args(), ["", "main", "d.hash=", "d.name="]);

    let raw = array(vec![
        array(vec!["abc123".into(), "Ubuntu.iso".into()]),
        array(vec!["def456".into(), "Debian.iso".into()]),
    ]);
    let torrents = call.decode(&raw)?;
    let summary: Vec<(&str, &str)> = torrents
        .iter()
        .map(|t| (t.hash.as_str(), t.name.as_str()))
        .collect();
    assert_eq!(summary, vec![("abc123", "Ubuntu.iso"), ("def456", "Debian.iso")]);
    Ok(())
}

#[test]
fn record_count_matches_row_count() -> Result<(), MulticallError> {
    let call = EntityCall::<Peer>::for_torrent("HASH").with_default_selectors();
    let width = call.selectors().len();
    for rows in [0_usize, 1, 7] {
        let raw = array(
            (0..rows)
                .map(|index| {
                    let mut row = vec![RpcValue::Nil; width];
                    row[0] = RpcValue::from(format!("peer-{index}"));
                    array(row)
                })
                .collect(),
        );
        let peers = call.decode(&raw)?;
        assert_eq!(peers.len(), rows);
        for (index, peer) in peers.iter().enumerate() {
            assert_eq!(peer.id, format!("peer-{index}"));
        }
    }
    Ok(())
}

#[test]
fn decoding_is_deterministic() -> Result<(), MulticallError> {
    let selectors = ["HASH", "", "t.id=", "t.url=", "t.is_enabled="];
    let raw = array(vec![array(vec![
        "tracker-0".into(),
        "udp://tracker.example:6969/announce".into(),
        RpcValue::Int(1),
    ])]);
    let first: Vec<Tracker> = decode_entities(Tracker::schema(), &selectors, &raw)?;
    let second: Vec<Tracker> = decode_entities(Tracker::schema(), &selectors, &raw)?;
    assert_eq!(first, second);
    assert_eq!(first[0].is_enabled, 1);
    Ok(())
}

#[test]
fn unknown_selectors_never_populate_fields() -> Result<(), MulticallError> {
    let selectors = ["", "main", "d.not_a_field=", "d.custom=tag"];
    let raw = array(vec![array(vec!["ignored".into(), RpcValue::Int(5)])]);
    let torrents = decode_entities(Torrent::schema(), &selectors, &raw)?;
    assert_eq!(torrents, vec![Torrent::default()]);
    Ok(())
}

#[test]
fn absent_values_resolve_to_zero_values() -> Result<(), MulticallError> {
    let call = EntityCall::<Torrent>::view("main").with_default_selectors();
    let raw = array(vec![array(vec![RpcValue::Nil; call.selectors().len()])]);
    let torrents = call.decode(&raw)?;
    assert_eq!(torrents, vec![Torrent::default()]);
    Ok(())
}

#[test]
fn row_length_mismatch_returns_no_records() {
    let selectors = ["", "main", "d.hash=", "d.name="];
    let raw = array(vec![
        array(vec!["abc123".into(), "Ubuntu.iso".into()]),
        array(vec!["def456".into()]),
    ]);
    let result = decode_entities(Torrent::schema(), &selectors, &raw);
    assert!(matches!(
        result,
        Err(MulticallError::RowLength {
            row: 1,
            expected: 2,
            actual: 1
        })
    ));
}

#[test]
fn system_scenario_populates_only_requested_facts() -> Result<(), MulticallError> {
    let calls = [
        SystemCall::targetless("system.hostname"),
        SystemCall::targetless("system.pid"),
    ];
    let raw = array(vec![array(vec!["host1".into()]), array(vec![RpcValue::Int(1234)])]);
    let facts = decode_system_facts(&calls, &raw)?;
    assert_eq!(facts.hostname, "host1");
    assert_eq!(facts.pid, 1234);
    assert_eq!(
        SystemFacts {
            hostname: String::new(),
            pid: 0,
            ..facts
        },
        SystemFacts::default()
    );
    Ok(())
}

#[test]
fn three_system_calls_fill_three_fields() -> Result<(), MulticallError> {
    let calls = SystemMulticall::new()
        .call(SystemCall::targetless("system.client_version"))
        .call(SystemCall::targetless("throttle.global_up.rate"))
        .call(SystemCall::targetless("system.unknown_fact"));
    let raw = array(vec![
        array(vec!["0.9.8".into()]),
        array(vec![RpcValue::Int(2048)]),
        array(vec!["whatever".into()]),
    ]);
    let facts = calls.decode(&raw)?;
    assert_eq!(
        facts,
        SystemFacts {
            client_version: "0.9.8".to_string(),
            throttle_global_up_rate: 2048,
            ..SystemFacts::default()
        }
    );
    Ok(())
}

#[test]
fn system_coercion_failure_is_fatal() {
    let calls = [SystemCall::targetless("system.pid")];
    let raw = array(vec![array(vec!["1234".into()])]);
    let err = decode_system_facts(&calls, &raw).expect_err("string pid");
    assert!(matches!(err, MulticallError::Coercion { found: "string", .. }));
}
