//! Stored attachment naming.

use chatrelay_gateway::upload::{sanitize_file_name, stored_name};

#[test]
fn sanitize_keeps_safe_chars() {
    assert_eq!(sanitize_file_name("voice-note_1.webm"), "voice-note_1.webm");
    assert_eq!(sanitize_file_name("my photo (1).png"), "my_photo__1_.png");
    assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
    assert_eq!(sanitize_file_name("résumé.pdf"), "r_sum_.pdf");
}

#[test]
fn stored_name_prefixes_capture_time() {
    assert_eq!(stored_name(1700000000123, "a b.txt"), "1700000000123-a_b.txt");
}
