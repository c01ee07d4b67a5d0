use std::collections::HashSet;

use super::{Config, Desktop};
use crate::error::{DesktopError, Result};
use crate::platform::VirtualDesktops;

/// Establish the naming invariants once at startup.
/// Naming must run before uniquification.
pub fn initialize<V: VirtualDesktops>(desktops: &V, config: &Config) -> Result<()> {
    ensure_no_unnamed(desktops, &config.home_name, &config.unnamed_name)?;
    ensure_unique_names(desktops)
}

/// Name the active desktop `home` if it is unnamed and `home` is free, then
/// give every remaining unnamed desktop `fallback`. Duplicates may remain.
pub fn ensure_no_unnamed<V: VirtualDesktops>(
    desktops: &V,
    home: &str,
    fallback: &str,
) -> Result<()> {
    let all = desktops.all_desktops()?;
    let taken: HashSet<String> = all.iter().filter_map(Desktop::name).collect();

    let current = desktops.current_desktop()?;
    if current.name().is_none() && !taken.contains(home) {
        tracing::info!("Naming active desktop {} as {}", current.id(), home);
        desktops.set_name(&current, home)?;
    }

    for desktop in all.iter().filter(|d| d.name().is_none()) {
        tracing::info!("Naming desktop {} as {}", desktop.id(), fallback);
        desktops.set_name(desktop, fallback)?;
    }
    Ok(())
}

/// Rename every later occurrence of a name, in native order, to the first
/// free `name + serial`.
pub fn ensure_unique_names<V: VirtualDesktops>(desktops: &V) -> Result<()> {
    let all = desktops.all_desktops()?;
    let mut taken: HashSet<String> = all.iter().filter_map(Desktop::name).collect();
    let mut seen = HashSet::new();

    for desktop in &all {
        let Some(name) = desktop.name() else {
            continue;
        };
        if seen.insert(name.clone()) {
            continue;
        }

        let unique = unique_name(&name, &taken);
        tracing::info!("Renaming duplicate desktop {} to {}", name, unique);
        desktops.set_name(desktop, &unique)?;
        taken.insert(unique.clone());
        seen.insert(unique);
    }
    Ok(())
}

/// `base` if free, otherwise `base` followed by the smallest serial from 1
/// that is not taken.
pub fn unique_name(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    let mut serial = 1u32;
    loop {
        let candidate = format!("{}{}", base, serial);
        if !taken.contains(&candidate) {
            return candidate;
        }
        serial += 1;
    }
}

/// First desktop in native order named `name`, or a new desktop with that
/// name.
pub fn get_or_create<V: VirtualDesktops>(desktops: &V, name: &str) -> Result<Desktop> {
    if name.trim().is_empty() {
        return Err(DesktopError::EmptyName);
    }

    if let Some(existing) = desktops
        .all_desktops()?
        .into_iter()
        .find(|d| d.has_name(name))
    {
        return Ok(existing);
    }

    let created = desktops.create_desktop()?;
    desktops.set_name(&created, name)?;
    tracing::info!("Created desktop {} ({})", name, created.id());
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockDesktops, MockWorld};

    fn names(list: &[&str]) -> Vec<Option<String>> {
        list.iter().map(|s| Some(s.to_string())).collect()
    }

    fn setup(desktops: &[Option<&str>], current: usize) -> MockDesktops {
        MockDesktops::new(
            MockWorld::new()
                .with_desktops(desktops)
                .with_current(current)
                .shared(),
        )
    }

    fn world_names(v: &MockDesktops) -> Vec<Option<String>> {
        v.all_desktops()
            .unwrap()
            .iter()
            .map(|d| d.name())
            .collect()
    }

    #[test]
    fn test_first_occurrence_is_positional() {
        let v = setup(&[Some("work"), Some("work"), Some("home")], 0);
        ensure_unique_names(&v).unwrap();
        assert_eq!(world_names(&v), names(&["work", "work1", "home"]));
    }

    #[test]
    fn test_serial_skips_taken_names() {
        let v = setup(&[Some("work"), Some("work"), Some("work1"), Some("work")], 0);
        ensure_unique_names(&v).unwrap();
        assert_eq!(
            world_names(&v),
            names(&["work", "work2", "work1", "work3"])
        );
    }

    #[test]
    fn test_active_unnamed_becomes_home() {
        let v = setup(&[None, None, Some("mail")], 1);
        ensure_no_unnamed(&v, "home", "work").unwrap();
        assert_eq!(
            world_names(&v),
            vec![Some("work".into()), Some("home".into()), Some("mail".into())]
        );
    }

    #[test]
    fn test_home_taken_falls_back() {
        let v = setup(&[Some("home"), None], 1);
        ensure_no_unnamed(&v, "home", "work").unwrap();
        assert_eq!(world_names(&v), names(&["home", "work"]));
    }

    #[test]
    fn test_initialize_yields_unique_non_empty_names() {
        let pool: [Option<&str>; 5] = [None, Some("home"), Some("work"), Some("work1"), Some("")];
        let config = Config::default();

        for len in 1..=4usize {
            let combos = pool.len().pow(len as u32);
            for combo in 0..combos {
                let mut seq = Vec::with_capacity(len);
                let mut n = combo;
                for _ in 0..len {
                    seq.push(pool[n % pool.len()]);
                    n /= pool.len();
                }
                for current in 0..len {
                    let v = setup(&seq, current);
                    initialize(&v, &config).unwrap();

                    let result = world_names(&v);
                    let mut unique = HashSet::new();
                    for name in &result {
                        let name = name.clone().expect("every desktop must be named");
                        assert!(!name.is_empty());
                        assert!(unique.insert(name), "duplicate in {:?} from {:?}", result, seq);
                    }

                    // Idempotent
                    ensure_unique_names(&v).unwrap();
                    assert_eq!(world_names(&v), result);
                }
            }
        }
    }

    #[test]
    fn test_unique_name() {
        let taken: HashSet<String> = ["work", "work1"].iter().map(|s| s.to_string()).collect();
        assert_eq!(unique_name("mail", &taken), "mail");
        assert_eq!(unique_name("work", &taken), "work2");
    }

    #[test]
    fn test_get_or_create_returns_first_match() {
        let v = setup(&[Some("a"), Some("mail"), Some("mail")], 0);
        let found = get_or_create(&v, "mail").unwrap();
        let all = v.all_desktops().unwrap();
        assert_eq!(found, all[1]);
    }

    #[test]
    fn test_get_or_create_twice_returns_same_handle() {
        let v = setup(&[Some("home")], 0);
        let first = get_or_create(&v, "mail").unwrap();
        let second = get_or_create(&v, "mail").unwrap();
        assert_eq!(first, second);
        assert_eq!(v.all_desktops().unwrap().len(), 2);
    }

    #[test]
    fn test_get_or_create_rejects_empty_name() {
        let v = setup(&[Some("home")], 0);
        assert_eq!(get_or_create(&v, "  ").err(), Some(DesktopError::EmptyName));
        assert!(v.calls().is_empty());
    }
}
