/// Non-Windows hosts have no administrator role to query.
pub fn is_process_elevated() -> bool {
    false
}
