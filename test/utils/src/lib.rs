pub fn analysis_reply_fixture() -> &'static str {
    return r#"
Thank you for walking me through how you would calm the customer down.

```json
{
  "communication": 82,
  "problemSolving": 74,
  "notes": "Acknowledged the complaint before proposing a fix."
}
```

Let's move on to the next scenario. A supplier has delivered the wrong spare parts.
"#
    .trim();
}

pub fn double_analysis_reply_fixture() -> &'static str {
    return r#"
First draft:
```json
{"attempt": 1}
```
Revised:
```json
{"attempt": 2}
```
Done."#
        .trim();
}

pub fn credentials_fixture() -> &'static str {
    return r#"[
  {
    "id": "4f1c2a9e-8b3d",
    "name": "Recruiting team",
    "secret": "AIzaSyA1234567890abcdefghijklmnopqrstu",
    "createdAt": "2024-03-01T09:00:00+07:00",
    "isActive": true
  },
  {
    "id": "7d2e4b1a-0c5f",
    "name": "Backup",
    "secret": "sk-abcdefghijklmnopqrstuvwxyz",
    "createdAt": "2024-03-02T09:00:00+07:00",
    "lastUsedAt": "2024-03-05T10:30:00+07:00",
    "isActive": false
  }
]"#;
}
