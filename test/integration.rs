// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{DirectoryFixture, ExportFixture};

use anyhow::Result;
use chrono::{TimeZone, Utc};
use edrn_sync::{
    directory::{with_session, Directory, DirectoryError, DirectorySettings, Entry},
    rdf::{open_groups, open_persons, open_sites, PersonDefaults, RdfError, Reference},
    SyncReport, Synchronizer,
};
use indoc::indoc;
use pretty_assertions::assert_eq;

const USERS: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
             xmlns:_3="http://xmlns.com/foaf/0.1/"
             xmlns:_4="http://edrn.nci.nih.gov/rdf/schema.rdf#">
      <rdf:Description rdf:about="http://edrn.nci.nih.gov/data/registered-person/1">
        <_3:givenname>Jane</_3:givenname>
        <_3:surname>Doe</_3:surname>
        <_3:mbox>mailto:jane.doe@example.org</_3:mbox>
        <_3:phone>(800) 555-1212 ext 9</_3:phone>
        <_4:site rdf:resource="http://edrn.nci.nih.gov/data/sites/7"/>
      </rdf:Description>
      <rdf:Description rdf:about="http://edrn.nci.nih.gov/data/registered-person/2">
        <_3:givenname>John</_3:givenname>
        <_3:surname>Smith, Jr.</_3:surname>
        <_3:mbox/>
        <_3:phone>call me</_3:phone>
        <_4:site rdf:resource="http://edrn.nci.nih.gov/data/sites/7"/>
      </rdf:Description>
      <rdf:Description rdf:about="http://edrn.nci.nih.gov/data/registered-person/3">
        <_3:givenname>Ada</_3:givenname>
        <_3:surname>Lovelace</_3:surname>
        <_3:accountName>ada</_3:accountName>
        <_3:mbox>mailto:ada@example.org</_3:mbox>
      </rdf:Description>
    </rdf:RDF>
"#};

const SITES: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
             xmlns:_3="http://edrn.nci.nih.gov/rdf/schema.rdf#"
             xmlns:_4="http://purl.org/dc/terms/">
      <rdf:Description rdf:about="http://edrn.nci.nih.gov/data/sites/7">
        <_3:abbrevName>JPL</_3:abbrevName>
        <_4:title>Jet Propulsion Laboratory</_4:title>
        <_3:pi rdf:resource="http://edrn.nci.nih.gov/data/registered-person/1"/>
        <_3:staff rdf:resource="http://edrn.nci.nih.gov/data/registered-person/1"/>
        <_3:staff rdf:resource="http://edrn.nci.nih.gov/data/registered-person/404"/>
        <_3:staff rdf:resource="http://edrn.nci.nih.gov/data/registered-person/2"/>
        <_3:program>EDRN</_3:program>
        <_3:memberType>Biomarker Developmental Laboratories</_3:memberType>
      </rdf:Description>
    </rdf:RDF>
"#};

const COMMITTEES: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
             xmlns:_3="http://edrn.nci.nih.gov/rdf/schema.rdf#"
             xmlns:_4="http://purl.org/dc/terms/">
      <rdf:Description rdf:about="http://edrn.nci.nih.gov/data/committees/5">
        <_4:title>Lung and Upper Aerodigestive Cancers</_4:title>
        <_3:member rdf:resource="http://edrn.nci.nih.gov/data/registered-person/3"/>
        <_3:member rdf:resource="http://edrn.nci.nih.gov/data/registered-person/2"/>
        <_3:committeeType>Collaborative Group</_3:committeeType>
      </rdf:Description>
    </rdf:RDF>
"#};

const BASE: &str = "dc=edrn,dc=jpl,dc=nasa,dc=gov";

#[test]
fn sync_people_from_user_export() -> Result<()> {
    let exports = ExportFixture::new()?;
    let users = exports.write("users.rdf", USERS)?;
    let persons = open_persons(&users, &PersonDefaults::default())?;

    let mut existing = Entry::new(format!("uid=ada,{BASE}"));
    existing.insert("uid", ["ada"]);
    let mut directory = DirectoryFixture::default().with_entry(existing);
    directory.bind("uid=admin,ou=system", "secret")?;

    let imported_at = Utc.with_ymd_and_hms(2012, 1, 2, 3, 4, 5).unwrap();
    let report = Synchronizer::new(&mut directory, DirectorySettings::default())
        .imported_at(imported_at)
        .sync_persons(&persons);

    assert_eq!(
        report,
        SyncReport {
            added: 2,
            existing: 1,
            ..SyncReport::default()
        }
    );

    let jane = &directory.entries[&format!("uid=jdoe,{BASE}")];
    assert_eq!(jane.values("cn"), ["Jane Doe"]);
    assert_eq!(jane.values("mail"), ["jane.doe@example.org"]);
    assert_eq!(jane.values("telephoneNumber"), ["800-555-1212"]);
    assert_eq!(
        jane.values("description"),
        ["imported via EDRN dmccsync at 2012-01-02T03:04:05"]
    );

    let john = &directory.entries[&format!("uid=jsmith,{BASE}")];
    assert_eq!(john.values("mail"), ["unknown@example.com"]);
    assert_eq!(john.values("telephoneNumber"), ["555-555-5555"]);
    assert_eq!(john.values("sn"), ["Smith, Jr."]);

    // Existing entry left untouched.
    let ada = &directory.entries[&format!("uid=ada,{BASE}")];
    assert!(ada.values("mail").is_empty());

    directory.unbind()?;
    assert_eq!(directory.binds, vec!["uid=admin,ou=system"]);
    assert!(directory.unbound);

    Ok(())
}

#[test]
fn rejected_person_is_counted_and_run_continues() -> Result<()> {
    let exports = ExportFixture::new()?;
    let users = exports.write("users.rdf", USERS)?;
    let persons = open_persons(&users, &PersonDefaults::default())?;

    let mut directory = DirectoryFixture::default().rejecting(format!("uid=jdoe,{BASE}"));
    let report = Synchronizer::new(&mut directory, DirectorySettings::default())
        .sync_persons(&persons);

    assert_eq!(report.added, 2);
    assert_eq!(report.failed, 1);
    assert!(directory.entries.contains_key(&format!("uid=ada,{BASE}")));

    Ok(())
}

#[test]
fn failed_search_is_counted_and_run_continues() -> Result<()> {
    let exports = ExportFixture::new()?;
    let users = exports.write("users.rdf", USERS)?;
    let persons = open_persons(&users, &PersonDefaults::default())?;

    let mut directory = DirectoryFixture::default().fail_search("(uid=jdoe)");
    let report = Synchronizer::new(&mut directory, DirectorySettings::default())
        .sync_persons(&persons);

    assert_eq!(
        report,
        SyncReport {
            added: 2,
            failed: 1,
            ..SyncReport::default()
        }
    );
    assert!(!directory.entries.contains_key(&format!("uid=jdoe,{BASE}")));
    assert!(directory.entries.contains_key(&format!("uid=jsmith,{BASE}")));
    assert!(directory.entries.contains_key(&format!("uid=ada,{BASE}")));

    Ok(())
}

#[test]
fn session_unbinds_after_work() -> Result<()> {
    let mut directory = DirectoryFixture::default();
    let value = with_session(&mut directory, "uid=admin,ou=system", "secret", |directory| {
        directory.binds.len()
    })?;

    assert_eq!(value, 1);
    assert!(directory.unbound);

    Ok(())
}

#[test]
fn rejected_bind_still_unbinds() {
    let mut directory = DirectoryFixture::default().rejecting_bind();
    let mut worked = false;
    let result = with_session(&mut directory, "uid=admin,ou=system", "wrong", |_| {
        worked = true;
    });

    assert!(matches!(
        result,
        Err(DirectoryError::OperationFailed { operation: "bind", .. })
    ));
    assert!(!worked);
    assert!(directory.unbound);
}

#[test]
fn site_document_resolves_against_user_document() -> Result<()> {
    let exports = ExportFixture::new()?;
    let users = exports.write("users.rdf", USERS)?;
    let sites = exports.write("sites.rdf", SITES)?;
    let persons = open_persons(&users, &PersonDefaults::default())?;
    let sites = open_sites(&sites, &persons)?;

    let site = sites.get("7").unwrap();
    assert_eq!(
        site.principal_investigator,
        Some(Reference::Resolved(persons.get("1").unwrap()))
    );
    let staff: Vec<_> = site
        .staff
        .iter()
        .map(|reference| reference.person().map(|p| p.account_id.as_str()))
        .collect();
    assert_eq!(staff, vec![Some("jdoe"), None, Some("jsmith")]);

    Ok(())
}

#[test]
fn sync_site_groups() -> Result<()> {
    let exports = ExportFixture::new()?;
    let users = exports.write("users.rdf", USERS)?;
    let sites = exports.write("sites.rdf", SITES)?;
    let persons = open_persons(&users, &PersonDefaults::default())?;
    let sites = open_sites(&sites, &persons)?;

    let mut directory = DirectoryFixture::default();
    let report = Synchronizer::new(&mut directory, DirectorySettings::default())
        .sync_sites(&sites);
    assert_eq!(report.added, 1);

    let group = &directory.entries[&format!("cn=Doe Jet Propulsion Laboratory,{BASE}")];
    assert_eq!(group.values("objectClass"), ["top", "groupOfUniqueNames"]);
    assert_eq!(group.values("cn"), ["Doe Jet Propulsion Laboratory"]);
    assert_eq!(
        group.values("uniqueMember"),
        [format!("uid=jdoe,{BASE}"), format!("uid=jsmith,{BASE}")]
    );

    // Second run finds the group and leaves it alone.
    let report = Synchronizer::new(&mut directory, DirectorySettings::default())
        .sync_sites(&sites);
    assert_eq!(
        report,
        SyncReport {
            existing: 1,
            ..SyncReport::default()
        }
    );

    Ok(())
}

#[test]
fn existing_group_left_alone_unless_merging() -> Result<()> {
    let exports = ExportFixture::new()?;
    let users = exports.write("users.rdf", USERS)?;
    let sites = exports.write("sites.rdf", SITES)?;
    let persons = open_persons(&users, &PersonDefaults::default())?;
    let sites = open_sites(&sites, &persons)?;

    let name = "Doe Jet Propulsion Laboratory";
    let mut existing = Entry::new(format!("cn={name},{BASE}"));
    existing.insert("objectClass", ["top", "groupOfUniqueNames"]);
    existing.insert("cn", [name]);
    existing.insert("uniqueMember", [format!("uid=jdoe,{BASE}")]);
    let mut directory = DirectoryFixture::default().with_entry(existing);

    let report = Synchronizer::new(&mut directory, DirectorySettings::default())
        .sync_sites(&sites);
    assert_eq!(report.existing, 1);
    let group = &directory.entries[&format!("cn={name},{BASE}")];
    assert_eq!(group.values("uniqueMember"), [format!("uid=jdoe,{BASE}")]);

    let report = Synchronizer::new(&mut directory, DirectorySettings::default())
        .merge_members(true)
        .sync_sites(&sites);
    assert_eq!(report.updated, 1);
    let group = &directory.entries[&format!("cn={name},{BASE}")];
    assert_eq!(
        group.values("uniqueMember"),
        [format!("uid=jdoe,{BASE}"), format!("uid=jsmith,{BASE}")]
    );

    // Nothing left to merge.
    let report = Synchronizer::new(&mut directory, DirectorySettings::default())
        .merge_members(true)
        .sync_sites(&sites);
    assert_eq!(report.existing, 1);

    Ok(())
}

#[test]
fn merge_into_group_below_base() -> Result<()> {
    let exports = ExportFixture::new()?;
    let users = exports.write("users.rdf", USERS)?;
    let sites = exports.write("sites.rdf", SITES)?;
    let persons = open_persons(&users, &PersonDefaults::default())?;
    let sites = open_sites(&sites, &persons)?;

    let name = "Doe Jet Propulsion Laboratory";
    let nested = format!("cn={name},ou=groups,{BASE}");
    let mut existing = Entry::new(nested.clone());
    existing.insert("objectClass", ["top", "groupOfUniqueNames"]);
    existing.insert("cn", [name]);
    existing.insert("uniqueMember", [format!("uid=jdoe,{BASE}")]);
    let mut directory = DirectoryFixture::default().with_entry(existing);

    let report = Synchronizer::new(&mut directory, DirectorySettings::default())
        .merge_members(true)
        .sync_sites(&sites);

    assert_eq!(
        report,
        SyncReport {
            updated: 1,
            ..SyncReport::default()
        }
    );
    assert_eq!(
        directory.entries[&nested].values("uniqueMember"),
        [format!("uid=jdoe,{BASE}"), format!("uid=jsmith,{BASE}")]
    );
    assert!(!directory.entries.contains_key(&format!("cn={name},{BASE}")));

    Ok(())
}

#[test]
fn sync_committee_groups() -> Result<()> {
    let exports = ExportFixture::new()?;
    let users = exports.write("users.rdf", USERS)?;
    let committees = exports.write("committees.rdf", COMMITTEES)?;
    let persons = open_persons(&users, &PersonDefaults::default())?;
    let groups = open_groups(&committees, &persons)?;

    let settings = DirectorySettings {
        base_dn: "dc=example,dc=org".into(),
        ..DirectorySettings::default()
    };
    let mut directory = DirectoryFixture::default();
    let report = Synchronizer::new(&mut directory, settings).sync_groups(&groups);
    assert_eq!(report.added, 1);

    let group = &directory.entries["cn=Lung and Upper Aerodigestive Cancers,dc=example,dc=org"];
    assert_eq!(
        group.values("uniqueMember"),
        ["uid=ada,dc=example,dc=org", "uid=jsmith,dc=example,dc=org"]
    );

    Ok(())
}

#[test]
fn malformed_export_aborts() -> Result<()> {
    let exports = ExportFixture::new()?;
    let users = exports.write("users.rdf", "<rdf:RDF><rdf:Description>")?;
    let result = open_persons(&users, &PersonDefaults::default());
    assert!(matches!(result, Err(RdfError::DocumentUnreadable { .. })));

    Ok(())
}
