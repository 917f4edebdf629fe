/// Scenario tests for client identity resolution
/// Drives raw rows through parse -> group -> fuzzy merge
use shop_clients_api::models::RawRow;
use shop_clients_api::resolution::resolve_profiles;

fn row(pairs: &[(&str, &str)]) -> RawRow {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_same_phone_newer_address_wins() {
        let rows = vec![
            row(&[
                ("Fecha", "10/1/2023"),
                ("Nombre", "Juan Perez"),
                ("Teléfono", "5512345678"),
            ]),
            row(&[
                ("Fecha", "15/6/2023"),
                ("Nombre", "Juan Perez"),
                ("Teléfono", "5512345678"),
                ("Dirección", "Calle Hidalgo 42"),
            ]),
        ];

        let resolution = resolve_profiles(&rows);
        assert_eq!(resolution.profiles.len(), 1);
        let profile = &resolution.profiles[0];
        assert_eq!(profile.address.as_deref(), Some("Calle Hidalgo 42"));
        assert_eq!(profile.name.as_deref(), Some("Juan Perez"));
    }

    #[test]
    fn test_name_subsumption_merges_into_newer_profile() {
        let rows = vec![
            row(&[
                ("Fecha", "3/2/2022"),
                ("Nombre", "Marco Lugo"),
                ("Placas", "JKL-456"),
            ]),
            row(&[
                ("Fecha", "8/9/2023"),
                ("Nombre", "Marco Antonio Lugo"),
                ("Placas", "MNO-789"),
            ]),
        ];

        let resolution = resolve_profiles(&rows);
        assert_eq!(resolution.profiles.len(), 1);
        let profile = &resolution.profiles[0];
        assert_eq!(profile.name.as_deref(), Some("Marco Antonio Lugo"));

        let mut plates: Vec<_> = profile
            .vehicles
            .iter()
            .filter_map(|v| v.plates.clone())
            .collect();
        plates.sort();
        assert_eq!(plates, vec!["JKL-456".to_string(), "MNO-789".to_string()]);
    }

    #[test]
    fn test_phone_conflict_keeps_namesakes_apart() {
        let rows = vec![
            row(&[
                ("Fecha", "1/3/2023"),
                ("Nombre", "Ana Ruiz"),
                ("Teléfono", "5511112222"),
            ]),
            row(&[
                ("Fecha", "2/3/2023"),
                ("Nombre", "Ana Ruiz"),
                ("Teléfono", "5599998888"),
            ]),
        ];

        let resolution = resolve_profiles(&rows);
        assert_eq!(resolution.profiles.len(), 2);
    }

    #[test]
    fn test_same_plates_newest_odometer_wins() {
        let rows = vec![
            row(&[
                ("Fecha", "1/1/2023"),
                ("Nombre", "Luis Mora"),
                ("Teléfono", "3312345678"),
                ("Placas", "ABC123"),
                ("No. Serie", "1HGCM82633A000001"),
                ("Kilometraje", "50000"),
            ]),
            row(&[
                ("Fecha", "1/7/2023"),
                ("Nombre", "Luis Mora"),
                ("Teléfono", "3312345678"),
                ("Placas", "ABC123"),
                ("No. Serie", "1HGCM82633A999999"),
                ("Kilometraje", "60000"),
            ]),
        ];

        let resolution = resolve_profiles(&rows);
        assert_eq!(resolution.profiles.len(), 1);
        let vehicles = &resolution.profiles[0].vehicles;
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].odometer.as_deref(), Some("60000"));
    }
}

#[cfg(test)]
mod invariant_tests {
    use super::*;

    #[test]
    fn test_rows_without_name_or_phone_never_contribute() {
        let rows = vec![
            row(&[("Fecha", "1/1/2023"), ("Placas", "ZZZ999")]),
            row(&[("Fecha", "1/1/2023"), ("Nombre", "Ana"), ("Placas", "AAA111")]),
        ];

        let resolution = resolve_profiles(&rows);
        assert_eq!(resolution.stats.rows_skipped, 1);
        assert!(resolution
            .profiles
            .iter()
            .flat_map(|p| p.vehicles.iter())
            .all(|v| v.plates.as_deref() != Some("ZZZ999")));
    }

    #[test]
    fn test_blank_phone_column_does_not_hide_cell_column() {
        let rows = vec![
            row(&[
                ("Fecha", "1/1/2023"),
                ("Nombre", "Ana Ruiz"),
                ("Teléfono", ""),
                ("Celular", "5511112222"),
            ]),
            row(&[
                ("Fecha", "2/1/2023"),
                ("Nombre", ""),
                ("Teléfono", ""),
                ("Celular", "55 1111 2222"),
            ]),
        ];

        let resolution = resolve_profiles(&rows);
        assert_eq!(resolution.stats.rows_skipped, 0);
        assert_eq!(resolution.profiles.len(), 1);

        let profile = &resolution.profiles[0];
        assert_eq!(profile.phone.as_deref(), Some("55 1111 2222"));
        assert_eq!(profile.name.as_deref(), Some("Ana Ruiz"));
        assert_eq!(profile.visit_count, 2);
    }

    #[test]
    fn test_sparse_repeat_visit_does_not_erase() {
        let rows = vec![
            row(&[
                ("Fecha", "1/1/2023"),
                ("Nombre", "Rosa Díaz"),
                ("Teléfono", "8187654321"),
                ("Correo", "rosa@example.com"),
                ("Colonia", "Del Valle"),
            ]),
            row(&[
                ("Fecha", "5/1/2023"),
                ("Nombre", "Rosa Díaz"),
                ("Teléfono", "8187654321"),
                ("Correo", "  "),
            ]),
        ];

        let profile = &resolve_profiles(&rows).profiles[0];
        assert_eq!(profile.email.as_deref(), Some("rosa@example.com"));
        assert_eq!(profile.colonia.as_deref(), Some("Del Valle"));
    }

    #[test]
    fn test_unparsable_date_loses_recency() {
        let rows = vec![
            row(&[
                ("Fecha", "sin fecha"),
                ("Nombre", "Pedro Gómez"),
                ("Teléfono", "5522223333"),
                ("Estado", "Puebla"),
            ]),
            row(&[
                ("Fecha", "2/2/2020"),
                ("Nombre", "Pedro Gómez"),
                ("Teléfono", "5522223333"),
                ("Estado", "Tlaxcala"),
            ]),
        ];

        let profile = &resolve_profiles(&rows).profiles[0];
        assert_eq!(profile.state.as_deref(), Some("Tlaxcala"));
        assert!(profile.latest_visit_timestamp > 0);
    }

    #[test]
    fn test_shared_serial_suffix_is_one_vehicle() {
        let rows = vec![
            row(&[
                ("Fecha", "1/1/2023"),
                ("Nombre", "Carla Núñez"),
                ("Teléfono", "5544445555"),
                ("No. Serie", "3N1AB7AP5KY123456"),
                ("Placas", "OLD-001"),
            ]),
            row(&[
                ("Fecha", "1/6/2023"),
                ("Nombre", "Carla Núñez"),
                ("Teléfono", "5544445555"),
                ("No. Serie", "ky123456"),
                ("Placas", "NEW-002"),
            ]),
        ];

        let profile = &resolve_profiles(&rows).profiles[0];
        assert_eq!(profile.vehicles.len(), 1);
        assert_eq!(profile.vehicles[0].plates.as_deref(), Some("NEW-002"));
    }

    #[test]
    fn test_older_profile_never_survives_merge() {
        let rows = vec![
            row(&[
                ("Fecha", "1/1/2024"),
                ("Nombre", "Sofía Herrera Campos"),
                ("Teléfono", "5566667777"),
            ]),
            row(&[("Fecha", "1/1/2021"), ("Nombre", "Sofia Herrera")]),
        ];

        let resolution = resolve_profiles(&rows);
        assert_eq!(resolution.profiles.len(), 1);
        let profile = &resolution.profiles[0];
        assert_eq!(profile.name.as_deref(), Some("Sofía Herrera Campos"));
        assert_eq!(profile.phone.as_deref(), Some("5566667777"));
        assert_eq!(profile.visit_count, 2);
    }
}
