use std::ptr;
use windows_sys::Win32::Foundation::{BOOL, PSID};
use windows_sys::Win32::Security::{
    AllocateAndInitializeSid, CheckTokenMembership, FreeSid, SECURITY_NT_AUTHORITY,
};
use windows_sys::Win32::System::SystemServices::{
    DOMAIN_ALIAS_RID_ADMINS, SECURITY_BUILTIN_DOMAIN_RID,
};

/// Checks whether the current process token is a member of the built-in
/// Administrators group.
///
/// Any failure of the underlying Win32 calls is reported as "not elevated".
pub fn is_process_elevated() -> bool {
    let mut admin_group: PSID = ptr::null_mut();

    // SAFETY: `admin_group` is a valid out-pointer and is released with
    // `FreeSid` below once the membership check is done.
    let allocated = unsafe {
        AllocateAndInitializeSid(
            &SECURITY_NT_AUTHORITY,
            2,
            SECURITY_BUILTIN_DOMAIN_RID as u32,
            DOMAIN_ALIAS_RID_ADMINS as u32,
            0,
            0,
            0,
            0,
            0,
            0,
            &mut admin_group,
        )
    };
    if allocated == 0 {
        return false;
    }

    let mut is_member: BOOL = 0;
    // SAFETY: a null token handle means "the calling thread's token";
    // `admin_group` was initialised above.
    let checked = unsafe { CheckTokenMembership(0, admin_group, &mut is_member) };
    unsafe {
        FreeSid(admin_group);
    }

    checked != 0 && is_member != 0
}
