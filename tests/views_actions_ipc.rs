use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_schooldeskd");
    let mut child = Command::new(exe)
        .env_remove("SCHOOLDESK_WORKSPACE")
        .env_remove("SCHOOLDESK_NO_SEED")
        .env_remove("SCHOOLDESK_PAGE_SIZE")
        .env_remove("SCHOOLDESK_MAX_VIEWS")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn schooldeskd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn error_code(value: &serde_json::Value) -> String {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

fn row_names(snapshot: &serde_json::Value) -> Vec<String> {
    snapshot["rows"]
        .as_array()
        .expect("rows")
        .iter()
        .map(|r| r["name"].as_str().unwrap_or("").to_string())
        .collect()
}

#[test]
fn student_view_tracks_state_and_deletes_the_displayed_row() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "views.open",
        json!({ "module": "students", "pageSize": 5 }),
    );
    let view_id = opened["viewId"].as_str().expect("viewId").to_string();
    assert_eq!(opened["total"], 14);
    assert_eq!(opened["totalPages"], 3);
    assert_eq!(opened["pageNumbers"], json!([1, 2, 3]));
    assert_eq!(opened["actions"][0]["label"], "View");
    assert_eq!(opened["actions"][1]["label"], "Delete");
    assert_eq!(opened["cells"][0][0], "Alice Johnson");

    let searched = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "views.update",
        json!({ "viewId": view_id, "search": "smith" }),
    );
    assert_eq!(row_names(&searched), vec!["Bob Smith"]);
    assert_eq!(searched["state"]["search"], "smith");

    let sorted = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "views.update",
        json!({ "viewId": view_id, "search": "", "sort": "name_desc", "page": 2 }),
    );
    assert_eq!(sorted["page"], 2);
    assert_eq!(
        row_names(&sorted),
        vec!["Hiro Tanaka", "Grace Okafor", "Farid Haddad", "Ella Rossi", "Daniel Kim"]
    );

    // Sorting again keeps the page.
    let resorted = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "views.update",
        json!({ "viewId": view_id, "sort": "name_asc" }),
    );
    assert_eq!(resorted["page"], 2);

    let back = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "views.update",
        json!({ "viewId": view_id, "sort": "name_desc", "nav": "next" }),
    );
    assert_eq!(back["page"], 3);
    let prev = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "views.update",
        json!({ "viewId": view_id, "nav": "prev" }),
    );
    assert_eq!(prev["page"], 2);

    let deleted = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "views.action",
        json!({ "viewId": view_id, "row": 1, "action": "delete" }),
    );
    assert_eq!(deleted["record"]["name"], "Grace Okafor");
    assert_eq!(deleted["effects"][0]["effect"], "deleted");
    assert_eq!(deleted["effects"][0]["id"], "stu-007");
    // The refreshed source starts over.
    assert_eq!(deleted["view"]["total"], 13);
    assert_eq!(deleted["view"]["page"], 1);
    assert!(deleted["view"]["state"]["sort"].is_null());

    let gone = request(
        &mut stdin,
        &mut reader,
        "8",
        "students.get",
        json!({ "id": "stu-007" }),
    );
    assert_eq!(error_code(&gone), "not_found");

    let out_of_range = request(
        &mut stdin,
        &mut reader,
        "9",
        "views.action",
        json!({ "viewId": view_id, "row": 99, "action": "View" }),
    );
    assert_eq!(error_code(&out_of_range), "row_out_of_range");

    let unknown_action = request(
        &mut stdin,
        &mut reader,
        "10",
        "views.action",
        json!({ "viewId": view_id, "row": 0, "action": "Archive" }),
    );
    assert_eq!(error_code(&unknown_action), "bad_params");

    let size = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "views.update",
        json!({ "viewId": view_id, "page": 3 }),
    );
    assert_eq!(size["page"], 3);
    let resized = request_ok(
        &mut stdin,
        &mut reader,
        "12",
        "views.update",
        json!({ "viewId": view_id, "pageSize": 4 }),
    );
    assert_eq!(resized["page"], 1);
    assert_eq!(resized["totalPages"], 4);

    let closed = request_ok(
        &mut stdin,
        &mut reader,
        "13",
        "views.close",
        json!({ "viewId": view_id }),
    );
    assert_eq!(closed["closed"], true);
    let stale = request(
        &mut stdin,
        &mut reader,
        "14",
        "views.update",
        json!({ "viewId": view_id, "search": "x" }),
    );
    assert_eq!(error_code(&stale), "not_found");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn notice_view_notify_action_stamps_the_notice() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let unknown = request(
        &mut stdin,
        &mut reader,
        "1",
        "views.open",
        json!({ "module": "grades" }),
    );
    assert_eq!(error_code(&unknown), "bad_params");

    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "views.open",
        json!({ "module": "notices" }),
    );
    let view_id = opened["viewId"].as_str().expect("viewId").to_string();
    assert_eq!(opened["actions"][2]["label"], "Notify");

    let by_priority = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "views.update",
        json!({ "viewId": view_id, "sort": "priority", "filter": { "key": "audience", "value": "all" } }),
    );
    assert_eq!(by_priority["rows"][0]["id"], "not-001");

    let notified = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "views.action",
        json!({ "viewId": view_id, "row": 0, "action": "Notify" }),
    );
    assert_eq!(notified["effects"][0]["effect"], "notified");
    assert!(notified["effects"][0]["notifiedAt"].is_string());

    let got = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "notices.get",
        json!({ "id": "not-001" }),
    );
    assert!(got["record"]["notifiedAt"].is_string());

    let high = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "views.update",
        json!({ "viewId": view_id, "filters": { "priority": "high" } }),
    );
    assert_eq!(high["total"], 3);

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn rejected_update_leaves_the_view_untouched() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "views.open",
        json!({ "module": "students", "pageSize": 5 }),
    );
    let view_id = opened["viewId"].as_str().expect("viewId").to_string();

    let third = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "views.update",
        json!({ "viewId": view_id, "page": 3 }),
    );
    assert_eq!(third["page"], 3);

    let rejected = [
        json!({ "viewId": view_id, "search": "smith", "nav": "sideways" }),
        json!({ "viewId": view_id, "search": "smith", "sort": 7 }),
        json!({ "viewId": view_id, "filters": { "status": "Active" }, "pageSize": -1 }),
        json!({ "viewId": view_id, "sort": "name_desc", "filters": ["Active"] }),
    ];
    for (i, params) in rejected.into_iter().enumerate() {
        let bad = request(&mut stdin, &mut reader, &format!("r{i}"), "views.update", params);
        assert_eq!(error_code(&bad), "bad_params");
    }

    let current = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "views.get",
        json!({ "viewId": view_id }),
    );
    assert_eq!(current["page"], 3);
    assert_eq!(current["total"], 14);
    assert_eq!(current["state"]["search"], "");
    assert!(current["state"]["sort"].is_null());
    assert_eq!(current["state"]["filters"].as_object().map(|f| f.len()), Some(0));

    drop(stdin);
    let _ = child.wait();
}
