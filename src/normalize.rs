//! String normalization — every comparison in the resolver happens between
//! normalized forms, so this module is applied both to incoming speaker
//! strings and (at load time) to every alias stored in the indexes.
//!
//! The passes, in order:
//!
//! 1. Parenthetical check: if the text inside the first balanced pair of
//!    parentheses normalizes to a known alias, that inner text *is* the
//!    speaker (reporters used parentheses to disambiguate, e.g.
//!    `"The Chancellor (Mr. Lloyd-George)"`). Otherwise parenthesized text
//!    is noise and is removed.
//! 2. Curated literal corrections for systematic OCR damage.
//! 3. Cleansing: lowercase, keep only `[a-z- ]`, collapse space runs.
//! 4. First-occurrence substitution from the loaded misspelling tables.
//! 5. Cleansing again.
//! 6. Anchored regex corrections: leading-token OCR confusions, honorific
//!    and office-prefix stripping, trailing noise tokens.

use once_cell::sync::Lazy;
use regex::Regex;

/// Lowercase, trim, drop anything that is not `[a-z- ]`, collapse runs of
/// spaces.
pub fn cleanse(s: &str) -> String {
    let lowered = s.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut last_space = true;
    for c in lowered.trim().chars() {
        match c {
            'a'..='z' | '-' => {
                out.push(c);
                last_space = false;
            }
            ' ' => {
                if !last_space {
                    out.push(' ');
                }
                last_space = true;
            }
            _ => {}
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

static PAREN_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^()]*)\)").unwrap());

/// Hand-curated literal fixes for OCR artefacts that appear in the raw
/// (pre-cleansing) speaker column. Ordered; applied as plain substring
/// replacements.
const LITERAL_PRE_CORRECTIONS: &[(&str, &str)] = &[
    ("Mr. Nicltolas Vansittart", "Mr. Nicholas Vansittart"),
    ("SIR WILLTAM HARCOURT", "SIR WILLIAM HARCOURT"),
    ("SIR WILLIAM HARCOURTM", "SIR WILLIAM HARCOURT"),
    ("SRI WILLIAM HARCOURT", "SIR WILLIAM HARCOURT"),
    ("Ma. LLOYD - GEORGE", "Mr. LLOYD-GEORGE"),
    ("The Hon. F. Robinson", "F. Robinson"),
    ("The Hon. Frederick Robinson", "Frederick Robinson"),
    ("By Mr. Robinson.", "Mr. Robinson"),
    ("Mr. Herries explained,", "Mr. Herries"),
    ("Mr. Goulbum", "Mr. Goulburn"),
    ("Mr. Goulbourne", "Mr. Goulburn"),
    ("Fraticis Baring", "Francis Baring"),
    ("DR. RUTHERFOORD-HARRIS", "MR. RUTHERFORD-HARRIS"),
    ("CLNINGHAME GRAHAM", "CUNNINGHAME GRAHAM"),
    ("DISKAELI", "DISRAELI"),
    ("DR.EARQUHARSON", "DR. FARQUHARSON"),
    ("EARL BEATJCHAMP", "EARL BEAUCHAMP"),
    ("LORD HERSGHELL", "LORD HERSCHEL"),
    ("SIR CHAELE8 W. DILKE", "SIR CHARLES W. DILKE"),
    ("VVASON", "WASON"),
    ("CATAIAN. BETHFLL", "CAPTAIN BETHELL"),
    ("CCNINGHAME GRAHAM", "CUNNINGHAME GRAHAM"),
    ("CHICLTESTER FORTESCUE", "CHICHESTER FORTESCUE"),
    ("Clninghame Graham", "Cunninghame Graham"),
    ("Colonel Vercker", "Colonel Parker"),
    ("Earl Conyngham", "Earl Cunningham"),
    ("Earl Of Malmesbtjry", "Earl of Malmesbury"),
    ("FER-GUSSOX", "FERGUSSON"),
    ("H.C RICHAKDS", "H. C. Richards"),
    ("HIE BXCHEQUER", "THE EXCHEQUER"),
    ("J. POWELL - WILLIAMS", "J. Powell-Williams"),
    ("KNATCHBITLL-HUGESSEN", "KNATCHBULL-HUGESSEN"),
    ("Knatchboll-hu-gessen", "Knatchbull-Hugessen"),
    ("Lord Casdereagh", "Lord Castlereagh"),
    ("Lord Elph1nston", "Lord Elphinstone"),
    ("MACLIVEE", "MACFIE"),
    ("Mr. Abereromby", "Mr. Abercrombie"),
    ("MR. B. SAMTTELSON", "MR. B. SAMUELSON"),
    ("MR. BRADLAITGH", "MR. BRADLAUGH"),
    ("Mr. Brougkam.", "Mr. Brougham"),
    ("Mr. Btoughtam.", "Mr. Brougham"),
    ("Mr. Buttertvorth", "Mr. Butterworth"),
    ("MR. CCNINGHAME GRAHAM", "MR. CUNNINGHAME GRAHAM"),
    ("MR. CDNINGHAME GRAHAM", "MR. CUNNINGHAME GRAHAM"),
    ("MR. CLNLNGHAME GRAHAM", "MR. CUNNINGHAME GRAHAM"),
    ("MR. COLLLNTGS", "MR. COLLINGS"),
    ("Mr. Conusgham", "Mr. Cunningham"),
    ("MR. CUNENGHAME GRAHAM", "MR. CUNNINGHAME GRAHAM"),
    ("MR. CUNLNGHAME GRAHAM", "MR. CUNNINGHAME GRAHAM"),
    ("MR. CUNUSTGHAME GRAHAM", "MR. CUNNINGHAME GRAHAM"),
    ("Mr. G. Jahnstone", "Mr. G. Johnson"),
    ("MR. HBADLAM", "MR. BEDLAM"),
    ("MR. KNATCHBOLL-HU-GESSEN", "MR. KNATCHBULL-HUGESSEN"),
    ("Mr. Marrryatt", "Mr. Marriott"),
    ("MR. O'KFEFFE", "MR. O'KEEFE"),
    ("MR. SYDNEY GBDGE", "MR. SYDNEY BRIDGE"),
    ("MR. T. M.'HEALY", "MR. TIM HEALY"),
    ("MR. W. E. FOPSTER", "MR. W. FORSTER"),
    ("SECRETARY OF STATE FOE INULA", "SECRETARY OF STATE FOR INDIA"),
    ("SECRETARY OF STATE FOII WAR", "SECRETARY OF STATE FOR WAR"),
    ("SIR BALDWYNLEIGHTON", "SIR BALDWIN LEIGHTON"),
    ("Sir F. Burdctt", "Sir F. Burdell"),
    ("SIR J. EERGUSSON", "Sir J. Ferguson"),
    ("SIR J. FERGDSSON", "SIR J. FERGUSON"),
    ("SIR J. FERGUSSOH", "SIR J. FERGUSON"),
    ("SIR J. FERGUSSOX", "SIR J. FERGUSON"),
    ("SIR J. PERGUSSON", "SIR J. FERGUSON"),
    ("Sir John Anslrutlter", "Sir John Anstruther"),
    ("Sir O. Moselcy", "Sir O. Mosley"),
    ("The Chan. of the Exchequer", "The Chancellor of the Exchequer"),
    ("The Chanc. of the Exchequer", "The Chancellor of the Exchequer"),
    ("The Chanc. of tie Excheq.", "The Chancellor of the Exchequer"),
    ("The Chancellar the Exchequer", "The Chancellor of the Exchequer"),
    ("The Marquis of Buckinghnm", "The Marquess of Buckingham"),
    ("The Marquis of Lans-downe", "Marquess of Lansdowne"),
    ("The Marquis of Lansdownne", "Marquess of Lansdowne"),
    ("ZOUCHE OF HARYNG-WORTH", "ZOUCHE OF HARRINGWORTH"),
    ("CAMP BELL-BANNERMAN", "CAMPBELL-BANNERMAN"),
    ("CAMPBELL-BANNER-MAN", "CAMPBELL-BANNERMAN"),
    ("Devoriport", "Devonport"),
    ("DR. MACNAAIARA", "DR. MCNAMARA"),
    ("DR. MACNAMARDR.", "DR. MCNAMARA"),
    ("DR. MACNAMRA", "DR. MCNAMARA"),
    ("EDMUND FITLMALURICE", "EDMUND FITZMAURICE"),
    ("FOR FOREIGN Ar FAIRS", "FOR FOREIGN AFFAIRS"),
    ("LOEDBISHOP OF HEREFORD", "LORD BISHOP OF HEREFORD"),
    ("LoRD CHANBORNE", "LORD CRANBOURNE"),
    ("LORD CRAN-BORNE", "LORD CRANBOURNE"),
    ("LORD EDMUNDFITZMAITRICE", "LORD EDMUND FITZMAURICE"),
    ("LORD TWKKDMOGTH", "LORD TWEEDMOUTH"),
    ("MARQUESS or LONDONDEUX", "MARQUESS OF LONDONDERRY"),
    ("Morimouthshire", "Monmouthshire"),
    ("MR. BKODRICK", "MR. BRODERICK"),
    ("MR. HABMSWOBTH", "MR. HEMSWORTH"),
    ("MR. HERBEIIT ROBERTS", "MR. HERBERT ROBERTS"),
    ("MR. LLYOD-GEOEGE", "MR. LLOYD-GEORGE"),
    ("MR. M c C R A E", "MR. MCRAE"),
    ("Mr. PBETYMAN", "Mr. PRETTYMAN"),
    ("Mr. PNETYMAN", "Mr. PRETTYMAN"),
    ("MR. RUNCINIAN", "Mr. RUNCIMAN"),
    ("MR.EAMENDROBERTSON", "MR. EDMUND ROBERTSON"),
    ("SIR GEORGE BAETLEY", "SIR GEORGE BAILEY"),
    ("SIR H. CAMPBELLBAN-NERMAN", "SIR H. CAMPBELL-BANNERMAN"),
    ("SIR. MANCHEEJEE BHOWNAGGREE", "SIR. MANCHERJEE BHOWNAGREE"),
    ("THE ADMIL ALTY", "THE ADMIRALTY"),
    ("THE CHIEF SECRETARY Foil IRELAND", "THE CHIEF SECRETARY FOR IRELAND"),
    ("TWEEDMOITTH", "TWEEDMOUTH"),
    ("UNDER-SECRETARy ofSTATE FOR", "UNDER SECRETARY OF STATE FOR"),
    ("DR. MACNAMAHA", "DR. MCNAMARA"),
    ("DR. MACXAMAEA", "DR. MCNAMARA"),
    ("LORD BALFOUROFBUELEIGH", "LORD BALFOUR OF BURLEIGH"),
    ("LORD EDMUND FITZ-MAUBICE", "LORD EDMUND FITZMAURICE"),
    ("MAONAMARA", "MCNAMARA"),
    ("MR. CHARLES HOBIIOUSE", "MR. CHARLES HOBHOUSE"),
    ("MR. GUTIIRIE", "MR. GUTHRIE"),
    ("MR. M'GOVKRN", "MR. MCGOVERN"),
    ("CAMPBELL-BAN HERMAN", "CAMPBELL-BANNERMAN"),
    ("EARL CARMNGTON", "EARL CARRINGTON"),
    ("EARL OF DONOCJGHMORE", "EARL OF DONOUGHMORE"),
    ("MAJOR ANSTRUTIIER-GRAY", "MAJOR ANSTRUTHER-GRAY"),
    ("MR. B E R T R A M", "MR. BERTRAM"),
    ("A. J.BALPOUR", "A. J. BALFOUR"),
    ("HERSCHBLL", "HERSCHEL"),
    ("DEPUTY-CHAIR M AN", "DEPUTY CHAIRMAN"),
    ("SIR FBEDEEICK BANBUEY", "SIR FREDERICK BANBURY"),
    ("ASQTJITH", "ASQUITH"),
    ("POSTMASTER - GENERA", "POSTMASTER GENERAL"),
    ("Mr. BROURICK", "Mr. BRODERICK"),
    ("BEODRICK", "BRODERICK"),
    ("AKERS- DOUWLAS", "AKERS DOUGLAS"),
    ("Mr. PEETYMAN", "Mr. PRETTYMAN"),
    ("MR. FETIIERSTONHAUGH", "MR. FETHERSTONHAUGH"),
    ("MR. WHITTAKEK", "Mr. Whitaker"),
    ("MR. BAULTON", "Mr. Bolton"),
    ("MR. BEODRIGK", "Mr. Broderick"),
    ("MR. CHARLES M'AETHUR", "Mr. Charles McArthur"),
    ("MANCHERJEE BHOWNAGGEEE", "Mancherjee Bhownagree"),
    ("CHRISTOPHER FTJRNESS", "Christopher Furness"),
    ("SIR FORTESCTJE FLANNERY", "Sir Fortescue Flannery"),
    ("SIR WTLLIAM TOMLINSON", "Sir William Tomlison"),
    ("GRIFFITH BOSOAWEN", "Arthur Griffith-Boscawen"),
    ("CAMPBEEL-BANNEERMAN", "Campbell-Bannerman"),
    ("CHANCELLOR OF THE EN-CHEQUER", "Chancellor of the Exchequer"),
    ("FEE-GUSSON", "Ferguson"),
    ("FERGHSSON", "Ferguson"),
    ("FERGUS-IRON", "Ferguson"),
    ("FERGUSSON", "Ferguson"),
    ("MANCHERJEE BHOWKAGGREE", "Mancherjee Bhownagree"),
    ("MANCHERJEE BHOWNAG-GREK", "Mancherjee Bhownagree"),
    ("SECRETARY FOE IRE LAND", "Secretary for Ireland"),
    ("SECRETARY OF ST ATE FOR WAR", "Secretary of State for War"),
    ("SECRETARY OF STALE", "Secretary of State for War"),
    ("SECRETARY OK STATE FOR FOREIGN", "Secretary of State for Foreign Affairs"),
    ("SECRETARY TO TILE TREASURY", "Secretary to the Treasury"),
    ("SIR CHARLKS DILKE", "Sir Charles Dike"),
    ("STATE FOR AVAR", "State for War"),
    ("TIIE COMMITTEE", "The Committee"),
    ("MR. T. L. COKBETT", "Mr. T. L. Corbett"),
    ("MR. T. L. COEBETT", "Mr. T. L. Corbett"),
    ("PBESIDENT OF THE BOARD OFTRADE", "President of the Board of Trade"),
    ("O'SHATHGHNESSY", "O'Shaughnessy"),
    ("O'SIIAUGHNESSY", "O'Shaughnessy"),
    ("THE MARQUESS OF LANSDOVVNE", "The Marquess of Lansdowne"),
    ("THE CHANCELLOR OF THE EX", "The Chancellor of the Exchequer"),
    ("FORTESCIJE FLANNERY", "Fortescue Flannery"),
    ("UNDEB SECBETAEY of STATE FOR WAR", "Under Secretary of State for War"),
    ("VICE-PEESIDENT OF THE BOAED of EDUCATION", "Vice President of the Board of Education"),
    ("MR. LABOITCHERE", "Mr. Labouchre"),
    ("ATTOENEY-GENERA", "Attorney General"),
    ("ATTORNE-GENERAL", "Attorney General"),
    ("MR. VICARYGIBBSMR.", "Mr. Vicary Gibbs"),
    ("GIBSON BOAVLES", "Gibson Bowles"),
    ("ARNOLD - FORSTEE", "Arnold-Forster"),
    ("OF:STATE FOE WAR", "of State for War"),
    ("BISHOP OF WINCHES TER", "Bishop of Manchester"),
    ("SECEETAEY TO THE ADMIE-ALTY", "Secretary to the Admiralty"),
    ("EOBEET FINLAY", "Robert Finlay"),
    ("ROBERT F1NLAY", "Robert Finlay"),
    ("COUNCIL ON EDU-", "Council of Education"),
];

/// The post-cleansing regex corrections. Ordered; each is applied once per
/// fixpoint iteration with `replace_all`. Patterns assume cleansed input
/// (lowercase, `[a-z- ]`, single-spaced).
const POST_CORRECTION_TABLE: &[(&str, &str)] = &[
    // Misspelled leading "the".
    ("^this +", "the "),
    ("^thr +", "the "),
    ("^then +", "the "),
    ("^tee +", "the "),
    ("^thh +", "the "),
    ("^tue +", "the "),
    ("^tmk +", "the "),
    ("^tub +", "the "),
    ("^he +", "the "),
    ("^tim +", "the "),
    ("^tme +", "the "),
    ("^tihe +", "the "),
    ("^thk +", "the "),
    ("^thb +", "the "),
    ("^tre +", "the "),
    ("^tile +", "the "),
    ("^tiie +", "the "),
    ("^t he +", "the "),
    // Remove leading "the".
    ("^the +", ""),
    // Leading mr confusions.
    ("^me +", "mr "),
    ("^mb +", "mr "),
    ("^mer +", "mr "),
    ("^mh +", "mr "),
    ("^mil +", "mr "),
    ("^mk +", "mr "),
    ("^mp +", "mr "),
    ("^ma +", "mr "),
    ("^mi +", "mr "),
    ("^m r +", "mr "),
    ("^dir +", "dr "),
    ("^dk +", "dr "),
    ("^de +", "dr "),
    ("^vick +", "vice "),
    (" image srcsvpi colcol", ""),
    ("^marquis +", "marquess "),
    ("^marqess +", "marquess "),
    ("^mauquess +", "marquess "),
    ("^manquess +", "marquess "),
    ("^marguess +", "marquess "),
    ("^marquees +", "marquess "),
    ("^marques +", "marquess "),
    ("^marquese +", "marquess "),
    ("^marquesss +", "marquess "),
    ("^mabquess +", "marquess "),
    ("^maeqttess +", "marquess "),
    ("^maequess +", "marquess "),
    ("^marqdess +", "marquess "),
    ("^marqiess +", "marquess "),
    ("^marqtjess +", "marquess "),
    ("^vicount +", "viscount "),
    ("^viscovnt +", "viscount "),
    ("^vicsount +", "viscount "),
    ("^vis- count +", "viscount "),
    ("^viscocnt +", "viscount "),
    ("^viscodnt +", "viscount "),
    ("^viscolunt +", "viscount "),
    ("^viscotint +", "viscount "),
    ("^viscotjnt +", "viscount "),
    ("^viscouint +", "viscount "),
    ("^viscoun +", "viscount "),
    ("^viscouxt +", "viscount "),
    ("^viscwnt +", "viscount "),
    ("^visoount +", "viscount "),
    ("^vtscount +", "viscount "),
    ("^viscuont +", "viscount "),
    ("^viscoust +", "viscount "),
    ("^viscounty +", "viscount "),
    ("^visct +", "viscount "),
    ("^lord viscount +", "viscount "),
    ("^lord speaker +", "speaker "),
    // Leading lord confusions.
    ("^lerd +", "lord "),
    ("^lard +", "lord "),
    ("^loed +", "lord "),
    ("^loro +", "lord "),
    ("^loud +", "lord "),
    ("^lort +", "lord "),
    ("^loup +", "lord "),
    ("^lobd +", "lord "),
    ("^loan +", "lord "),
    ("^load +", "lord "),
    ("^lokd +", "lord "),
    ("^lold +", "lord "),
    ("^lore +", "lord "),
    ("^lorn +", "lord "),
    ("^lorrd +", "lord "),
    ("^lors +", "lord "),
    ("^losd +", "lord "),
    ("^lose +", "lord "),
    ("^lour +", "lord "),
    ("^lrd +", "lord "),
    ("^ord +", "lord "),
    // Leading earl confusions.
    ("^earb +", "earl "),
    ("^ear +", "earl "),
    ("^ealr +", "earl "),
    ("^eari +", "earl "),
    ("^eaul +", "earl "),
    ("^early +", "earl "),
    ("^east +", "earl "),
    ("^eeal +", "earl "),
    ("^arl +", "earl "),
    ("^eahl +", "earl "),
    ("^eael +", "earl "),
    ("^eakl +", "earl "),
    ("^eard +", "earl "),
    ("^eall +", "earl "),
    ("^eart +", "earl "),
    ("^farl +", "earl "),
    ("^dike +", "duke "),
    ("^duek +", "duke "),
    ("^ducke +", "duke "),
    ("^duck +", "duke "),
    ("^chamberlatn +", "chamberlain "),
    // Leading sir confusions.
    ("^sib +", "sir "),
    ("^sin +", "sir "),
    ("^sit +", "sir "),
    ("^sip +", "sir "),
    ("^siu +", "sir "),
    ("^sik +", "sir "),
    ("^sat +", "sir "),
    ("^sie +", "sir "),
    ("^silt +", "sir "),
    ("^sri +", "sir "),
    ("^sr +", "sir "),
    ("^str +", "sir "),
    ("^air +", "sir "),
    ("^si +", "sir "),
    ("^sdi +", "sir "),
    ("^slr +", "sir "),
    ("^abmiral +", "admiral "),
    ("^admtral +", "admiral "),
    ("^admieal +", "admiral "),
    ("^admiraj +", "admiral "),
    ("^admibal +", "admiral "),
    ("^admtralty +", "admiralty "),
    ("^adralty +", "admiralty "),
    ("^admihalty +", "admiralty "),
    ("^ad-jmiralty +", "admiralty "),
    ("^admil alty +", "admiralty "),
    ("^admir alty +", "admiralty "),
    ("^trea-iury +", "treasury "),
    ("^trea-treasury +", "treasury "),
    ("^treastry +", "treasury "),
    ("^trea sury +", "treasury "),
    ("^cafiain +", "captain "),
    ("^caftain +", "captain "),
    ("^caitain +", "captain "),
    ("^capain +", "captain "),
    ("^capatain +", "captain "),
    ("^capiain +", "captain "),
    ("^capt +", "captain "),
    ("^vaptain +", "captain "),
    ("^col +", "colonel "),
    ("^colconel +", "colonel "),
    ("^coionel +", "colonel "),
    ("^colnel +", "colonel "),
    ("^colokel +", "colonel "),
    ("^colonal +", "colonel "),
    ("^colonbl +", "colonel "),
    ("^coloxel +", "colonel "),
    ("^colonl +", "colonel "),
    ("^colosel +", "colonel "),
    ("^colonei +", "colonel "),
    ("^eirst +", "first "),
    ("^fiest +", "first "),
    ("^archblsiiop +", "archbishop "),
    ("^bistiop +", "bishop "),
    ("^bisliop +", "bishop "),
    ("^bisiiop +", "bishop "),
    ("^lord bishop +", "bishop "),
    ("^atiorney +", "attorney "),
    ("^attornby +", "attorney "),
    ("^attorne +", "attorney "),
    ("^attorney- +", "attorney-"),
    ("^gen +", "general "),
    ("^genebal +", "general "),
    ("^generai +", "general "),
    ("^genekal +", "general "),
    ("^genenal +", "general "),
    ("^genera +", "general "),
    ("^gexeral +", "general "),
    ("^geneeal +", "general "),
    ("^solioitor +", "solicitor "),
    ("^solicttor +", "solicitor "),
    ("peivy", "privy"),
    ("chanoellor", "chancellor"),
    // Chancellor-of-the-exchequer salvage.
    ("chancellor of the e xciiequer", "chancellor of the exchequer"),
    ("chancellor of the exchequer-chequer", "chancellor of the exchequer"),
    ("changellor of the exche-quer", "chancellor of the exchequer"),
    ("chancellor the exchequee", "chancellor of the exchequer"),
    ("chancellor of theexche-quer", "chancellor of the exchequer"),
    ("chancellor of we exchequer", "chancellor of the exchequer"),
    ("cbancellor of the exche-quer", "chancellor of the exchequer"),
    ("^chan of the exchequer$", "chancellor of the exchequer"),
    ("^chanc of the excheq$", "chancellor of the exchequer"),
    ("^chancellok of the exche-quek$", "chancellor of the exchequer"),
    ("^chancellor of the exchequerchequer$", "chancellor of the exchequer"),
    ("^chanc of the exchequer$", "chancellor of the exchequer"),
    ("^chancelloe of the exche-quer$", "chancellor of the exchequer"),
    ("^chanc of tie excheq$", "chancellor of the exchequer"),
    ("^chanckllor of the exchequer$", "chancellor of the exchequer"),
    ("^chancellor of file exchequer$", "chancellor of the exchequer"),
    ("^chancelloerof the exche-quer$", "chancellor of the exchequer"),
    ("^chancelloe of the ex-chequee$", "chancellor of the exchequer"),
    ("^chancelloe of the exchequer$", "chancellor of the exchequer"),
    ("^chancellor of the ex-cheqner$", "chancellor of the exchequer"),
    ("^chancellor ok the exchequerr$", "chancellor of the exchequer"),
    ("^chancellor of tub exchequerr$", "chancellor of the exchequer"),
    ("^chancellor ok thk exchequerr$", "chancellor of the exchequer"),
    ("^chancellob of the exchequerr$", "chancellor of the exchequer"),
    ("^chancelor of the exchequerr$", "chancellor of the exchequer"),
    ("^the chancellor if the exchequer$", "chancellor of the exchequer"),
    ("^the chancellor of die exchequer$", "chancellor of the exchequer"),
    ("^the chancellor of tie exchequer$", "chancellor of the exchequer"),
    ("ex-chequer", "exchequer"),
    (r"excheque\b", "exchequer"),
    ("hie bxchequer", "exchequer"),
    ("mrjor", "major"),
    // Chairman-of-ways-and-means variants.
    ("^chairman ways and means$", "chairman"),
    ("^chat rman of ways and means$", "chairman"),
    ("^ghairman of ways and means$", "chairman"),
    ("^chairman airman of ways and means$", "chairman"),
    ("^chairman of wats and means$", "chairman"),
    ("^chairman of ways and means$", "chairman"),
    ("^chairman of was and means$", "chairman"),
    ("^chairman of committees of ways and means$", "chairman"),
    ("^chairman of committees$", "chairman"),
    ("^chairman of commhtees$", "chairman"),
    ("^chairman of commitmees$", "chairman"),
    ("^ceairman$", "chairman"),
    ("^mr chairman$", "chairman"),
    ("^chair man$", "chairman"),
    ("speaker-elect", "speaker"),
    ("memberconstituencymemberconstituency", ""),
    // Leading filler words.
    ("^a +", ""),
    ("^and +", ""),
    ("^answered by +", ""),
    ("^another +", ""),
    ("^both +", ""),
    ("^by +", ""),
    ("^here +", ""),
    // Trailing narration tokens.
    (" on$", ""),
    (" said$", ""),
    (" ampc$", ""),
    ("ampc$", ""),
    (" i$", ""),
    (" replied$", ""),
    (" continued$", ""),
    (" presumed$", ""),
    (" resumed$", ""),
    (" resuming$", ""),
    (" also$", ""),
    (" felt$", ""),
    (" avar$", " war"),
    ("irelandland", "ireland"),
    (" tiie ", " the "),
    (" tile ", " the "),
    // Mid-string of/for confusions.
    (" de ", " of "),
    (" oe ", " of "),
    (" uf ", " of "),
    (" op ", " of "),
    (" or ", " of "),
    (" ov ", " of "),
    (" fob ", " for "),
    (" foe ", " for "),
    (" toe ", " for "),
    (" statf ", " state "),
    (" boaed ", " board "),
    (" statf$", " state"),
    ("under +secretary", "under-secretary"),
    ("under +- +secretary", "under-secretary"),
    ("secketay +", "secretary "),
    (r"lieutenant[\- ]?colonel +", ""),
    ("lieut(.*)col", ""),
    ("lieut", ""),
    ("^the hon ", ""),
    ("memberconstituency", ""),
    ("^right hon +", ""),
    (" +observed$", ""),
    ("^general sir +", "sir "),
    ("^mr secretary +", "mr "),
    (
        "^vice-president of the council +",
        "vice-president of the committee of council on education",
    ),
    (
        "^vice president of the council +",
        "vice-president of the committee of council on education",
    ),
    // Office-prefix phrases preceding the actual name.
    ("^secretary of state for war +", ""),
    ("^president of the local government board +", ""),
    ("^president of the board of agriculture +", ""),
    ("^president of the board of trade +", ""),
    ("^secretary of state for the home department +", ""),
    ("^secretary of state for the colonies +", ""),
    ("^secretary to the treasurey +", ""),
    ("^first commissioner of works +", ""),
    ("^secretary to the admiralty +", ""),
    ("^secretary of state for india +", ""),
    ("^secretary to the local government board +", ""),
    ("^parliamentary secretary to the local government board +", ""),
    ("^-attorney", "attorney"),
    ("^mr attorney-?general", "attorney-general"),
    ("^she attorney", "attorney"),
    ("^attorney-?general sir [a-z ]+", "attorney-general"),
    // Hyphen surrounded by spaces.
    (" + - +", "-"),
    // Words preceding a title word.
    ("^.+ viscount ", "viscount "),
    ("^.+ sir ", "sir "),
    ("^.+ mr ", "mr "),
];

static POST_CORRECTIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    POST_CORRECTION_TABLE
        .iter()
        .map(|(pat, rep)| (Regex::new(pat).unwrap(), *rep))
        .collect()
});

/// Apply the anchored regex corrections until they stop changing the
/// string, then trim. The fixpoint loop keeps normalization idempotent
/// when several rules chain (misspelled "the" then "the"-removal, stacked
/// trailing noise tokens).
pub fn post_correct(s: &str) -> String {
    let mut current = s.to_string();
    for _ in 0..8 {
        let mut next = current.clone();
        for (re, rep) in POST_CORRECTIONS.iter() {
            if let std::borrow::Cow::Owned(replaced) = re.replace_all(&next, *rep) {
                next = replaced;
            }
        }
        next = next.trim().to_string();
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// The full C1 normalizer. Owns the loaded misspelling tables; the curated
/// literal and regex tables are compiled in.
#[derive(Debug, Default)]
pub struct Normalizer {
    /// `(incorrect, correct)` pairs in load order; each replaces the first
    /// occurrence of `incorrect` as a substring.
    corrections: Vec<(String, String)>,
}

impl Normalizer {
    pub fn new(corrections: Vec<(String, String)>) -> Self {
        Self { corrections }
    }

    /// Produce the canonical search key for a raw speaker string.
    ///
    /// `known_alias` reports whether a normalized string is an alias of some
    /// member; it gates the parenthetical-disambiguation exception.
    pub fn canonical_key(&self, raw: &str, known_alias: impl Fn(&str) -> bool) -> String {
        if let Some(caps) = PAREN_GROUP.captures(raw) {
            let inner = post_correct(&cleanse(&caps[1]));
            if !inner.is_empty() && known_alias(&inner) {
                return inner;
            }
        }

        let mut s = PAREN_GROUP.replace_all(raw, "").into_owned();
        for (bad, good) in LITERAL_PRE_CORRECTIONS {
            if s.contains(bad) {
                s = s.replace(bad, good);
            }
        }

        s = cleanse(&s);
        for (bad, good) in &self.corrections {
            if let Some(pos) = s.find(bad.as_str()) {
                s.replace_range(pos..pos + bad.len(), good);
            }
        }
        s = cleanse(&s);

        post_correct(&s)
    }
}

/// Normalize an alias for storage in an index: cleanse plus the regex pass,
/// no parenthetical handling and no misspelling tables. Stored forms and
/// query keys must agree, so every externally supplied alias goes through
/// this before it lands in a table.
pub fn index_alias(alias: &str) -> String {
    post_correct(&cleanse(alias))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> String {
        Normalizer::default().canonical_key(raw, |_| false)
    }

    #[test]
    fn cleanse_basics() {
        assert_eq!(cleanse("  LOr,D   of  the\t Trea_sury  "), "lord of the treasury");
        assert_eq!(cleanse("Smith-Abney-Hastings"), "smith-abney-hastings");
        assert_eq!(cleanse("123!@#"), "");
    }

    #[test]
    fn leading_title_confusions() {
        assert_eq!(key("MB. SMITH"), "mr smith");
        assert_eq!(key("LOBD DERBY"), "lord derby");
        assert_eq!(key("EAKL GREY"), "earl grey");
        assert_eq!(key("Vicount Palmerston"), "viscount palmerston");
        assert_eq!(key("SRI WILLIAM HARCOURT"), "sir william harcourt");
    }

    #[test]
    fn honorific_and_noise_stripping() {
        assert_eq!(key("The Right Hon. Mr. Gladstone said"), "mr gladstone");
        assert_eq!(key("Mr. Disraeli replied"), "mr disraeli");
        assert_eq!(key("THE CHANCELLOR OF THE EX"), "chancellor of the exchequer");
        assert_eq!(key("Chan. of the Exchequer"), "chancellor of the exchequer");
    }

    #[test]
    fn parenthetical_noise_is_removed() {
        assert_eq!(
            key("LORD DENMAN (who was very imperfectly heard)"),
            "lord denman"
        );
    }

    #[test]
    fn parenthetical_known_alias_wins() {
        let n = Normalizer::default();
        let k = n.canonical_key("The Chancellor (Mr. Lloyd-George)", |s| {
            s == "mr lloyd-george"
        });
        assert_eq!(k, "mr lloyd-george");
    }

    #[test]
    fn misspelling_substitution_is_first_occurrence() {
        let n = Normalizer::new(vec![("smyth".into(), "smith".into())]);
        assert_eq!(
            n.canonical_key("Mr. Smyth Smyth", |_| false),
            "mr smith smyth"
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "Mr. J. Smith",
            "The Chancellor of the Exchequer",
            "VISCOUNT PALMERSTON",
            "he lord of the treasury",
            "MB. SMITH said",
            "Lord   of  Treasury",
            "  ",
            "1234",
            "mrs somebody",
        ];
        let n = Normalizer::default();
        for s in samples {
            let once = n.canonical_key(s, |_| false);
            let twice = n.canonical_key(&once, |_| false);
            assert_eq!(once, twice, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn empty_and_nonalphabetic_inputs() {
        assert_eq!(key(""), "");
        assert_eq!(key("!!! ??? 42"), "");
    }
}
