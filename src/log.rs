lazy_static! {
    pub static ref DBG_LOG_LEVEL: usize = {
        use std::env;

        match env::var("PINCONV_LOG_LEVEL") {
            Ok(lvl) => usize::from_str_radix(lvl.trim(), 10).unwrap_or(DBG_WARN),
            Err(_) => DBG_WARN,
        }
    };

    pub static ref DBG_PRINT_CODE_INFO: usize = {
        use std::env;

        match env::var("PINCONV_PRINT_CODE_INFO") {
            Ok(lvl) => usize::from_str_radix(lvl.trim(), 10).unwrap_or(0),
            Err(_) => 0,
        }
    };
}

pub const DBG_CRITICAL: usize = 0;
pub const DBG_WARN: usize = 1;
pub const DBG_INFO: usize = 2;
pub const DBG_EXTRA: usize = 3;

pub const LOG_LVL_STR: &'static [&'static str] = &[
    /* 0 */ "CRITICAL",
    /* 1 */ "WARNING",
    /* 2 */ "INFO",
    /* 3 */ "EXTRA INFO"
];

/* Critical messages and warnings are user-facing (grammar diagnostics, invalid pins),
 * so they survive release builds. Chatter above DBG_WARN is debug-only. */
macro_rules! dbg_log {
    ($lvl:expr, $fmt:literal $(, $v:expr )* $(,)?) => {
        let lvl = (crate::log::LOG_LVL_STR.len() - 1).min($lvl);
        if (cfg!(debug_assertions) || lvl <= crate::log::DBG_WARN)
            && *crate::log::DBG_LOG_LEVEL >= lvl
        {
            if *crate::log::DBG_PRINT_CODE_INFO != 0 {
                dbg!(
                    crate::log::LOG_LVL_STR[lvl],
                    format!($fmt $(, &$v )*)
                );
            } else {
                eprintln!(
                    concat!("{}: ", $fmt),
                    crate::log::LOG_LVL_STR[lvl] $(, &$v )*
                );
            }
        }
    };
}
